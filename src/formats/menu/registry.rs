//! Command registry: the static tag table the menu codec dispatches on
//!
//! Maps each known command tag to its display metadata and payload shape.
//! Several historical tags alias an earlier one and share its payload.
//! The table is built once and never mutated at runtime; unknown tags
//! resolve to `None` and fall back to the generic payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Payload shape a tag dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadKind {
    /// Slot name + location + Euler rotation.
    AttachPoint,
    /// Property name + float value.
    Property,
    /// Raw string fields, any arity.
    Generic,
}

/// Registry metadata for one command tag.
#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub tag: &'static str,
    /// English display label.
    pub label: &'static str,
    /// Display grouping.
    pub category: &'static str,
    /// Ordering key within pickers.
    pub sort_key: u16,
    pub kind: PayloadKind,
    /// Canonical tag this one is a historical alias of.
    pub alias_of: Option<&'static str>,
}

use self::PayloadKind::{AttachPoint, Generic, Property};

/// Every tag the game's menu loader reacts to, plus decorative ones seen
/// in shipped files.
pub static COMMANDS: &[CommandInfo] = &[
    // Menu meta
    cmd("end", "End", "Menu Meta", 0),
    cmd("name", "Menu Name", "Menu Meta", 3),
    cmd("saveitem", "Menu Category", "Menu Meta", 4),
    cmd("setumei", "Menu Description", "Menu Meta", 5),
    cmd("priority", "Priority", "Menu Meta", 6),
    cmd("メニューフォルダ", "Folder", "Menu Meta", 7),
    cmd("icon", "Icon", "Menu Meta", 10),
    alias("icons", "Icon (Small)", "Menu Meta", 11, "icon"),
    cmd("iconl", "Icon (Large)", "Menu Meta", 12),
    // Item meta
    cmd("ver", "Item Version", "Item Meta", 20),
    cmd("category", "Item Category", "Item Meta", 21),
    cmd("catno", "Item Category Number", "Item Meta", 22),
    cmd("アイテム", "Item", "Item Meta", 30),
    cmd("アイテム条件", "Item Conditions", "Item Meta", 31),
    cmd("if", "Item If", "Item Meta", 32),
    cmd("アイテムパラメータ", "Item Parameters", "Item Meta", 33),
    cmd("半脱ぎ", "Item Half Off", "Item Meta", 34),
    alias("リソース参照", "Item Resource Reference", "Item Meta", 35, "半脱ぎ"),
    // Item control
    cmd("set", "Set", "Item Control", 40),
    cmd("setname", "Set Name", "Item Control", 41),
    cmd("setslotitem", "Set Slot Item", "Item Control", 42),
    cmd("additem", "Add Item", "Item Control", 43),
    cmd("unsetitem", "Unset Item", "Item Control", 44),
    cmd("nofloory", "Disable Item Floor", "Item Control", 45),
    cmd("maskitem", "Mask Item", "Item Control", 46),
    cmd("delitem", "Delete Item", "Item Control", 47),
    cmd("node消去", "Node Hide", "Item Control", 50),
    cmd("node表示", "Node Display", "Item Control", 51),
    cmd("パーツnode消去", "Parts-Node Hide", "Item Control", 52),
    cmd("パーツnode表示", "Parts-Node Display", "Item Control", 53),
    // Material control
    cmd("color", "Color", "Material Control", 60),
    cmd("mancolor", "Man Color", "Material Control", 61),
    cmd("color_set", "Color-Set", "Material Control", 62),
    cmd("tex", "Texture", "Material Control", 70),
    alias("テクスチャ変更", "Texture Change", "Material Control", 71, "tex"),
    cmd("テクスチャ乗算", "Texture Multiplication", "Material Control", 72),
    cmd("テクスチャ合成", "Texture Composition", "Material Control", 73),
    cmd("テクスチャセット合成", "Texture Set Composition", "Material Control", 74),
    cmd("マテリアル変更", "Material Change", "Material Control", 80),
    cmd("useredit", "Material Properties", "Material Control", 81),
    cmd("shader", "Shader", "Material Control", 90),
    // Maid control
    CommandInfo {
        tag: "prop",
        label: "Property",
        category: "Maid Control",
        sort_key: 100,
        kind: Property,
        alias_of: None,
    },
    CommandInfo {
        tag: "アタッチポイントの設定",
        label: "Attach Point",
        category: "Maid Control",
        sort_key: 110,
        kind: AttachPoint,
        alias_of: None,
    },
    cmd("blendset", "Face Blend-Set", "Maid Control", 120),
    cmd("paramset", "Face Parameter-Set", "Maid Control", 121),
    cmd("commenttype", "Profile Comment Type", "Maid Control", 130),
    cmd("bonemorph", "Bone Morph", "Maid Control", 140),
    cmd("length", "Hair Length", "Maid Control", 141),
    cmd("anime", "Animation", "Maid Control", 150),
    cmd("animematerial", "Animation (Material)", "Maid Control", 151),
    cmd("param2", "Parameter 2", "Maid Control", 160),
    // Misc
    cmd("setstr", "Set String", "Misc.", 170),
    cmd("onclickmenu", "onclickmenu", "Misc.", 200),
    cmd("属性追加", "addattribute", "Misc.", 201),
];

const fn cmd(
    tag: &'static str,
    label: &'static str,
    category: &'static str,
    sort_key: u16,
) -> CommandInfo {
    CommandInfo {
        tag,
        label,
        category,
        sort_key,
        kind: Generic,
        alias_of: None,
    }
}

const fn alias(
    tag: &'static str,
    label: &'static str,
    category: &'static str,
    sort_key: u16,
    alias_of: &'static str,
) -> CommandInfo {
    CommandInfo {
        tag,
        label,
        category,
        sort_key,
        kind: Generic,
        alias_of: Some(alias_of),
    }
}

lazy_static::lazy_static! {
    static ref BY_TAG: HashMap<&'static str, &'static CommandInfo> = {
        let mut m = HashMap::with_capacity(COMMANDS.len());
        for info in COMMANDS {
            m.insert(info.tag, info);
        }
        m
    };
}

/// Look up a tag by exact string match.
pub fn lookup(tag: &str) -> Option<&'static CommandInfo> {
    BY_TAG.get(tag).copied()
}

/// Payload shape for a tag; unknown tags are [`PayloadKind::Generic`].
pub fn payload_kind(tag: &str) -> PayloadKind {
    lookup(tag).map_or(Generic, |info| info.kind)
}

/// Display label for a tag, falling back to the tag itself.
pub fn display_label(tag: &str) -> &str {
    lookup(tag).map_or(tag, |info| info.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_resolve() {
        let info = lookup("prop").unwrap();
        assert_eq!(info.kind, PayloadKind::Property);
        assert_eq!(info.category, "Maid Control");

        let info = lookup("アタッチポイントの設定").unwrap();
        assert_eq!(info.kind, PayloadKind::AttachPoint);
        assert_eq!(info.label, "Attach Point");
    }

    #[test]
    fn unknown_tags_fall_back_to_generic() {
        assert!(lookup("zzz_custom").is_none());
        assert_eq!(payload_kind("zzz_custom"), PayloadKind::Generic);
        assert_eq!(display_label("zzz_custom"), "zzz_custom");
    }

    #[test]
    fn aliases_share_their_canonical_payload() {
        let texture_change = lookup("テクスチャ変更").unwrap();
        let tex = lookup(texture_change.alias_of.unwrap()).unwrap();
        assert_eq!(texture_change.kind, tex.kind);

        let icons = lookup("icons").unwrap();
        assert_eq!(icons.alias_of, Some("icon"));
    }

    #[test]
    fn tags_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for info in COMMANDS {
            assert!(seen.insert(info.tag), "duplicate tag {}", info.tag);
        }
    }

    #[test]
    fn aliases_point_at_real_tags() {
        for info in COMMANDS {
            if let Some(target) = info.alias_of {
                assert!(lookup(target).is_some(), "alias target {target} missing");
            }
        }
    }
}

//! CM3D2 `.menu` outfit-command format
//!
//! A `.menu` file is a short header followed by an ordered stream of
//! variable-arity command chunks, each a counted list of strings whose
//! first field is the command tag. Chunk order is semantically
//! significant (later unset/delete commands act on earlier state) and is
//! preserved exactly on round-trip.

mod editor;
mod reader;
pub mod registry;
mod writer;

pub use reader::{parse_menu_bytes, read_menu};
pub use writer::{serialize_menu, write_menu};

use serde::{Deserialize, Serialize};

use self::registry::PayloadKind;

/// Magic string opening every `.menu` file.
pub const MENU_SIGNATURE: &str = "CM3D2_MENU";

/// Hard bound on a chunk's field count: the wire stores it in one byte.
pub const MAX_CHUNK_FIELDS: usize = 255;

/// A fully decoded `.menu` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub version: i32,
    /// In-game path of the menu entry.
    pub path: String,
    pub name: String,
    pub category: String,
    pub description: String,
    /// Command chunks, stream order.
    pub commands: Vec<MenuCommand>,
    /// Caller-side selection cursor; revalidated by every structural
    /// mutation, `None` when the list is empty.
    pub active_index: Option<usize>,
}

impl Default for Menu {
    fn default() -> Self {
        Self {
            version: 1000,
            path: String::new(),
            name: String::new(),
            category: String::new(),
            description: String::new(),
            commands: Vec::new(),
            active_index: None,
        }
    }
}

/// One command chunk, dispatched by tag to a typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MenuCommand {
    AttachPoint(AttachPointCommand),
    Property(PropertyCommand),
    /// Catch-all for every tag without a registered typed payload.
    Generic(GenericCommand),
}

/// `アタッチポイントの設定`: defines a named attachment slot relative to
/// the base bone. Rotation is Euler degrees on the wire, radians here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachPointCommand {
    /// Tag literal as it appeared on the wire.
    pub tag: String,
    pub slot_name: String,
    pub location: [f32; 3],
    /// Euler angles, radians.
    pub rotation: [f32; 3],
}

/// `prop`: sets a named float property on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCommand {
    pub tag: String,
    pub prop_name: String,
    pub value: f32,
}

/// Any other command: tag plus its raw string fields, verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericCommand {
    pub tag: String,
    pub params: Vec<String>,
}

impl MenuCommand {
    /// The chunk's tag literal.
    pub fn tag(&self) -> &str {
        match self {
            MenuCommand::AttachPoint(c) => &c.tag,
            MenuCommand::Property(c) => &c.tag,
            MenuCommand::Generic(c) => &c.tag,
        }
    }

    /// Flatten back to the wire field list, tag first.
    pub fn to_fields(&self) -> Vec<String> {
        match self {
            MenuCommand::AttachPoint(c) => {
                let mut fields = Vec::with_capacity(8);
                fields.push(c.tag.clone());
                fields.push(c.slot_name.clone());
                for v in c.location {
                    fields.push(format!("{v}"));
                }
                for v in c.rotation {
                    fields.push(format!("{}", v.to_degrees()));
                }
                fields
            }
            MenuCommand::Property(c) => {
                vec![c.tag.clone(), c.prop_name.clone(), format!("{}", c.value)]
            }
            MenuCommand::Generic(c) => {
                let mut fields = Vec::with_capacity(1 + c.params.len());
                fields.push(c.tag.clone());
                fields.extend(c.params.iter().cloned());
                fields
            }
        }
    }

    /// Human-readable label for list UIs: the registry label plus the
    /// payload's distinguishing fields.
    pub fn display_name(&self) -> String {
        let label = registry::display_label(self.tag());
        match self {
            MenuCommand::AttachPoint(c) => format!("{label} : {}", c.slot_name),
            MenuCommand::Property(c) => format!("{label} : {} = {}", c.prop_name, c.value),
            MenuCommand::Generic(_) => label.to_string(),
        }
    }

    /// Registry payload kind for this command's tag.
    pub fn payload_kind(&self) -> PayloadKind {
        match self {
            MenuCommand::AttachPoint(_) => PayloadKind::AttachPoint,
            MenuCommand::Property(_) => PayloadKind::Property,
            MenuCommand::Generic(_) => PayloadKind::Generic,
        }
    }
}

/// A non-fatal decode diagnostic: one chunk failed its typed parse and
/// was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkWarning {
    /// Position of the chunk in the stream, counting dropped chunks.
    pub chunk_index: usize,
    pub tag: String,
    pub message: String,
}

impl std::fmt::Display for ChunkWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "chunk {} ('{}') dropped: {}",
            self.chunk_index, self.tag, self.message
        )
    }
}

/// A decoded menu plus the warnings accumulated while decoding it.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuReadResult {
    pub menu: Menu,
    pub warnings: Vec<ChunkWarning>,
}

impl Menu {
    /// The command the selection cursor points at, if any.
    pub fn active_command(&self) -> Option<&MenuCommand> {
        self.commands.get(self.active_index?)
    }
}

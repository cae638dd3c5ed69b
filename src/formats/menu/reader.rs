//! `.menu` file reading and parsing

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use super::registry::{self, PayloadKind};
use super::{
    AttachPointCommand, ChunkWarning, GenericCommand, Menu, MenuCommand, MenuReadResult,
    PropertyCommand, MENU_SIGNATURE,
};
use crate::error::{Error, Result};
use crate::formats::common::{read_i32, read_string, read_u8};

/// Read a `.menu` file from disk
///
/// # Errors
///
/// Returns [`Error::InvalidMenuMagic`] if the file does not open with the
/// `CM3D2_MENU` signature, [`Error::UnexpectedEof`] on truncation inside
/// a chunk, and [`Error::Io`] if the file cannot be opened or read.
pub fn read_menu<P: AsRef<Path>>(path: P) -> Result<MenuReadResult> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_menu_bytes(&buffer)
}

/// Parse `.menu` data from bytes
///
/// A chunk that fails its typed parse (bad float, wrong arity) is dropped
/// with a [`ChunkWarning`] and decoding continues at the next chunk
/// boundary; hand-edited files must not abort the whole import. Stream
/// truncation inside a chunk is still fatal.
pub fn parse_menu_bytes(data: &[u8]) -> Result<MenuReadResult> {
    let mut cursor = Cursor::new(data);

    let magic = read_string(&mut cursor)?;
    if magic != MENU_SIGNATURE {
        return Err(Error::InvalidMenuMagic { found: magic });
    }

    let version = read_i32(&mut cursor)?;
    let path = read_string(&mut cursor)?;
    let name = read_string(&mut cursor)?;
    let category = read_string(&mut cursor)?;
    let description = read_string(&mut cursor)?;

    // Declared byte length of the chunk region, sentinel included. The
    // game never interprets it beyond preallocation; we only cross-check.
    let declared_len = read_i32(&mut cursor)?;
    let region_start = cursor.position();

    let mut commands = Vec::new();
    let mut warnings = Vec::new();
    let mut chunk_index = 0usize;
    let mut fields = Vec::new();

    loop {
        // Hand-truncated files may simply stop between chunks.
        let field_count = match read_u8(&mut cursor) {
            Ok(n) => n,
            Err(Error::UnexpectedEof { .. }) => {
                tracing::warn!("menu chunk stream ended without sentinel");
                break;
            }
            Err(e) => return Err(e),
        };
        if field_count == 0 {
            break;
        }

        fields.clear();
        for _ in 0..field_count {
            fields.push(read_string(&mut cursor)?);
        }

        match parse_chunk(&fields) {
            Ok(command) => commands.push(command),
            Err(message) => {
                let warning = ChunkWarning {
                    chunk_index,
                    tag: fields[0].clone(),
                    message,
                };
                tracing::warn!("{warning}");
                warnings.push(warning);
            }
        }
        chunk_index += 1;
    }

    let consumed = cursor.position() - region_start;
    if declared_len >= 0 && consumed != declared_len as u64 {
        tracing::warn!(
            "menu declared a {declared_len}-byte chunk region, consumed {consumed}"
        );
    }

    Ok(MenuReadResult {
        menu: Menu {
            version,
            path,
            name,
            category,
            description,
            commands,
            active_index: None,
        },
        warnings,
    })
}

/// Dispatch one chunk's field list by its leading tag.
fn parse_chunk(fields: &[String]) -> std::result::Result<MenuCommand, String> {
    let tag = fields[0].clone();
    match registry::payload_kind(&tag) {
        PayloadKind::AttachPoint => {
            if fields.len() != 8 {
                return Err(format!("expected 8 fields, found {}", fields.len()));
            }
            Ok(MenuCommand::AttachPoint(AttachPointCommand {
                tag,
                slot_name: fields[1].clone(),
                location: [
                    parse_float(&fields[2])?,
                    parse_float(&fields[3])?,
                    parse_float(&fields[4])?,
                ],
                rotation: [
                    parse_float(&fields[5])?.to_radians(),
                    parse_float(&fields[6])?.to_radians(),
                    parse_float(&fields[7])?.to_radians(),
                ],
            }))
        }
        PayloadKind::Property => {
            if fields.len() != 3 {
                return Err(format!("expected 3 fields, found {}", fields.len()));
            }
            Ok(MenuCommand::Property(PropertyCommand {
                tag,
                prop_name: fields[1].clone(),
                value: parse_float(&fields[2])?,
            }))
        }
        PayloadKind::Generic => Ok(MenuCommand::Generic(GenericCommand {
            tag,
            params: fields[1..].to_vec(),
        })),
    }
}

fn parse_float(field: &str) -> std::result::Result<f32, String> {
    field
        .parse::<f32>()
        .map_err(|_| format!("'{field}' is not a number"))
}

#[cfg(test)]
mod tests {
    use super::super::serialize_menu;
    use super::*;
    use crate::formats::common::{write_i32, write_string, write_u8};
    use pretty_assertions::assert_eq;

    fn chunk(buf: &mut Vec<u8>, fields: &[&str]) {
        write_u8(buf, fields.len() as u8).unwrap();
        for field in fields {
            write_string(buf, field).unwrap();
        }
    }

    fn menu_bytes(build: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
        let mut region = Vec::new();
        build(&mut region);
        region.push(0x00);

        let mut buf = Vec::new();
        write_string(&mut buf, "CM3D2_MENU").unwrap();
        write_i32(&mut buf, 1000).unwrap();
        write_string(&mut buf, "dress/dress01.menu").unwrap();
        write_string(&mut buf, "dress01").unwrap();
        write_string(&mut buf, "dress").unwrap();
        write_string(&mut buf, "a test dress").unwrap();
        write_i32(&mut buf, region.len() as i32).unwrap();
        buf.extend_from_slice(&region);
        buf
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut buf = Vec::new();
        write_string(&mut buf, "CM3D2_MESH").unwrap();
        assert!(matches!(
            parse_menu_bytes(&buf),
            Err(Error::InvalidMenuMagic { .. })
        ));
    }

    #[test]
    fn malformed_chunk_is_dropped_not_fatal() {
        let bytes = menu_bytes(|region| {
            chunk(region, &["category", "dress"]);
            chunk(region, &["icons", "dress01_i_.tex"]);
            chunk(region, &["アイテム", "dress01.model"]);
            chunk(region, &["prop", "koshi", "not_a_number"]);
            chunk(region, &["prop", "mune_L", "50"]);
            chunk(region, &["delitem", "skirt"]);
        });

        let result = parse_menu_bytes(&bytes).unwrap();
        assert_eq!(result.menu.commands.len(), 5);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].chunk_index, 3);
        assert_eq!(result.warnings[0].tag, "prop");
        // decode resumed cleanly after the bad chunk
        assert_eq!(result.menu.commands[3].tag(), "prop");
        assert_eq!(result.menu.commands[4].tag(), "delitem");
    }

    #[test]
    fn unknown_tag_falls_back_to_generic_and_roundtrips() {
        let bytes = menu_bytes(|region| {
            chunk(region, &["zzz_custom", "one", "two", "three"]);
        });

        let result = parse_menu_bytes(&bytes).unwrap();
        let MenuCommand::Generic(generic) = &result.menu.commands[0] else {
            panic!("expected generic payload");
        };
        assert_eq!(generic.tag, "zzz_custom");
        assert_eq!(generic.params, vec!["one", "two", "three"]);

        let reencoded = serialize_menu(&result.menu).unwrap();
        assert_eq!(reencoded, bytes);
    }

    #[test]
    fn attach_point_rotation_is_radians_in_memory() {
        let bytes = menu_bytes(|region| {
            chunk(
                region,
                &[
                    "アタッチポイントの設定",
                    "左手",
                    "0.1",
                    "0.2",
                    "0.3",
                    "90",
                    "0",
                    "-90",
                ],
            );
        });

        let result = parse_menu_bytes(&bytes).unwrap();
        let MenuCommand::AttachPoint(attach) = &result.menu.commands[0] else {
            panic!("expected attach point payload");
        };
        assert_eq!(attach.slot_name, "左手");
        assert_eq!(attach.location, [0.1, 0.2, 0.3]);
        assert!((attach.rotation[0] - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((attach.rotation[2] + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn missing_sentinel_is_tolerated() {
        let mut region = Vec::new();
        chunk(&mut region, &["category", "dress"]);
        // no trailing 0x00

        let mut buf = Vec::new();
        write_string(&mut buf, "CM3D2_MENU").unwrap();
        write_i32(&mut buf, 1000).unwrap();
        for s in ["p", "n", "c", "d"] {
            write_string(&mut buf, s).unwrap();
        }
        write_i32(&mut buf, region.len() as i32 + 1).unwrap();
        buf.extend_from_slice(&region);

        let result = parse_menu_bytes(&buf).unwrap();
        assert_eq!(result.menu.commands.len(), 1);
    }

    #[test]
    fn truncation_inside_a_chunk_is_fatal() {
        let mut buf = Vec::new();
        write_string(&mut buf, "CM3D2_MENU").unwrap();
        write_i32(&mut buf, 1000).unwrap();
        for s in ["p", "n", "c", "d"] {
            write_string(&mut buf, s).unwrap();
        }
        write_i32(&mut buf, 99).unwrap();
        write_u8(&mut buf, 3).unwrap(); // three fields promised
        write_string(&mut buf, "prop").unwrap(); // only one delivered

        assert!(matches!(
            parse_menu_bytes(&buf),
            Err(Error::UnexpectedEof { .. })
        ));
    }
}

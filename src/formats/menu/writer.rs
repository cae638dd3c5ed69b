//! `.menu` file writing

#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use std::path::Path;

use super::{Menu, MAX_CHUNK_FIELDS, MENU_SIGNATURE};
use crate::error::{Error, Result};
use crate::formats::common::{write_i32, write_string, write_u8};

/// Write a `.menu` file to disk
///
/// The full stream is serialized in memory first so a failure never
/// leaves a truncated file behind.
pub fn write_menu<P: AsRef<Path>>(path: P, menu: &Menu) -> Result<()> {
    let bytes = serialize_menu(menu)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Serialize a menu to bytes
///
/// Chunks serialize in list order, each as its flat field list behind a
/// single count byte; the region closes with a `0x00` sentinel and its
/// byte length (sentinel included) is written ahead of it.
///
/// # Errors
///
/// Returns [`Error::TooManyChunkFields`] if a chunk flattens to more
/// than 255 fields; the count must fit in one byte, so this is fatal
/// rather than a silent truncation.
pub fn serialize_menu(menu: &Menu) -> Result<Vec<u8>> {
    let mut region = Vec::new();
    for command in &menu.commands {
        let fields = command.to_fields();
        if fields.len() > MAX_CHUNK_FIELDS {
            return Err(Error::TooManyChunkFields {
                tag: command.tag().to_string(),
                count: fields.len(),
            });
        }
        write_u8(&mut region, fields.len() as u8)?;
        for field in &fields {
            write_string(&mut region, field)?;
        }
    }
    region.push(0x00);

    let mut out = Vec::new();
    write_string(&mut out, MENU_SIGNATURE)?;
    write_i32(&mut out, menu.version)?;
    write_string(&mut out, &menu.path)?;
    write_string(&mut out, &menu.name)?;
    write_string(&mut out, &menu.category)?;
    write_string(&mut out, &menu.description)?;
    write_i32(&mut out, region.len() as i32)?;
    out.extend_from_slice(&region);
    Ok(out)
}

//! Primitive binary I/O shared by the MODEL and MENU codecs
//!
//! CM3D2 streams are little-endian throughout. Strings are UTF-8 with a
//! 7-bit-continuation varint length prefix (the .NET `BinaryWriter`
//! convention) and no terminator.

#![allow(clippy::cast_possible_truncation)]

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Sanity cap on a single string's byte length, both directions.
///
/// Real CM3D2 strings are short names and paths; a prefix beyond this is
/// a corrupt or hostile stream, not data.
pub const MAX_STRING_LEN: usize = 1024 * 1024;

fn truncated<R: Seek>(r: &mut R, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::UnexpectedEof {
            offset: r.stream_position().unwrap_or(0),
        }
    } else {
        Error::Io(e)
    }
}

/// Read a 7-bit-continuation varint length prefix.
fn read_7bit_len<R: Read + Seek>(r: &mut R) -> Result<usize> {
    let mut len: usize = 0;
    let mut shift = 0u32;
    loop {
        let byte = r.read_u8().map_err(|e| truncated(r, e))?;
        len |= usize::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        // 5 bytes cover the full 32-bit range the game could emit
        if shift >= 35 {
            return Err(Error::InvalidFormat(
                "string length prefix does not terminate".to_string(),
            ));
        }
    }
    Ok(len)
}

fn write_7bit_len<W: Write>(w: &mut W, mut len: usize) -> Result<()> {
    while len >= 0x80 {
        w.write_u8((len as u8 & 0x7F) | 0x80)?;
        len >>= 7;
    }
    w.write_u8(len as u8)?;
    Ok(())
}

/// Read a length-prefixed UTF-8 string.
///
/// # Errors
///
/// Returns [`Error::UnexpectedEof`] if the stream ends before the declared
/// length is satisfied, [`Error::StringTooLong`] if the prefix exceeds
/// [`MAX_STRING_LEN`], and [`Error::Utf8`] if the bytes are not UTF-8.
pub fn read_string<R: Read + Seek>(r: &mut R) -> Result<String> {
    let len = read_7bit_len(r)?;
    if len > MAX_STRING_LEN {
        return Err(Error::StringTooLong {
            len,
            max: MAX_STRING_LEN,
        });
    }
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes).map_err(|e| truncated(r, e))?;
    Ok(String::from_utf8(bytes)?)
}

/// Read the string at the current position without consuming it.
///
/// Returns `Ok(None)` on a clean end of stream (no length byte left).
/// Used for the one-tag lookahead that terminates material property lists
/// and the morph section.
pub fn peek_string<R: Read + Seek>(r: &mut R) -> Result<Option<String>> {
    let start = r.stream_position()?;
    let mut probe = [0u8; 1];
    if r.read(&mut probe)? == 0 {
        return Ok(None);
    }
    r.seek(SeekFrom::Start(start))?;
    let s = read_string(r)?;
    r.seek(SeekFrom::Start(start))?;
    Ok(Some(s))
}

/// Write a length-prefixed UTF-8 string.
///
/// # Errors
///
/// Returns [`Error::StringTooLong`] rather than mis-encoding a string
/// longer than [`MAX_STRING_LEN`].
pub fn write_string<W: Write>(w: &mut W, s: &str) -> Result<()> {
    let bytes = s.as_bytes();
    if bytes.len() > MAX_STRING_LEN {
        return Err(Error::StringTooLong {
            len: bytes.len(),
            max: MAX_STRING_LEN,
        });
    }
    write_7bit_len(w, bytes.len())?;
    w.write_all(bytes)?;
    Ok(())
}

pub fn read_u8<R: Read + Seek>(r: &mut R) -> Result<u8> {
    r.read_u8().map_err(|e| truncated(r, e))
}

pub fn read_u16<R: Read + Seek>(r: &mut R) -> Result<u16> {
    r.read_u16::<LittleEndian>().map_err(|e| truncated(r, e))
}

pub fn read_i32<R: Read + Seek>(r: &mut R) -> Result<i32> {
    r.read_i32::<LittleEndian>().map_err(|e| truncated(r, e))
}

pub fn read_f32<R: Read + Seek>(r: &mut R) -> Result<f32> {
    r.read_f32::<LittleEndian>().map_err(|e| truncated(r, e))
}

/// Read `N` consecutive little-endian floats.
pub fn read_f32_array<R: Read + Seek, const N: usize>(r: &mut R) -> Result<[f32; N]> {
    let mut out = [0f32; N];
    for v in &mut out {
        *v = read_f32(r)?;
    }
    Ok(out)
}

/// Read a 4x4 float matrix as four row arrays, wire order.
pub fn read_mat4<R: Read + Seek>(r: &mut R) -> Result<[[f32; 4]; 4]> {
    Ok([
        read_f32_array(r)?,
        read_f32_array(r)?,
        read_f32_array(r)?,
        read_f32_array(r)?,
    ])
}

pub fn write_u8<W: Write>(w: &mut W, v: u8) -> Result<()> {
    w.write_u8(v)?;
    Ok(())
}

pub fn write_u16<W: Write>(w: &mut W, v: u16) -> Result<()> {
    w.write_u16::<LittleEndian>(v)?;
    Ok(())
}

pub fn write_i32<W: Write>(w: &mut W, v: i32) -> Result<()> {
    w.write_i32::<LittleEndian>(v)?;
    Ok(())
}

pub fn write_f32<W: Write>(w: &mut W, v: f32) -> Result<()> {
    w.write_f32::<LittleEndian>(v)?;
    Ok(())
}

pub fn write_f32_array<W: Write>(w: &mut W, vals: &[f32]) -> Result<()> {
    for &v in vals {
        write_f32(w, v)?;
    }
    Ok(())
}

pub fn write_mat4<W: Write>(w: &mut W, m: &[[f32; 4]; 4]) -> Result<()> {
    for row in m {
        write_f32_array(w, row)?;
    }
    Ok(())
}

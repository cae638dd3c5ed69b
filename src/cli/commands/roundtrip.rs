//! CLI command for round-trip checking the codecs against real files

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, bail};

use crate::formats::common::read_string;
use crate::formats::menu::{MENU_SIGNATURE, parse_menu_bytes, serialize_menu};
use crate::formats::model::{MODEL_SIGNATURE, parse_model_bytes, serialize_model};

pub fn execute(source: &Path, destination: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(source)
        .with_context(|| format!("failed to read {}", source.display()))?;

    let magic = read_string(&mut Cursor::new(bytes.as_slice()))
        .with_context(|| format!("{} has no readable signature", source.display()))?;

    let reencoded = match magic.as_str() {
        MODEL_SIGNATURE => serialize_model(&parse_model_bytes(&bytes)?)?,
        MENU_SIGNATURE => {
            let result = parse_menu_bytes(&bytes)?;
            for warning in &result.warnings {
                eprintln!("warning: {warning}");
            }
            serialize_menu(&result.menu)?
        }
        other => bail!("unrecognized signature {other:?} in {}", source.display()),
    };

    std::fs::write(destination, &reencoded)
        .with_context(|| format!("failed to write {}", destination.display()))?;

    if reencoded == bytes {
        println!("byte-identical ({} bytes)", reencoded.len());
    } else {
        let diff_at = bytes
            .iter()
            .zip(&reencoded)
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| bytes.len().min(reencoded.len()));
        println!(
            "differs: {} -> {} bytes, first difference at offset {diff_at}",
            bytes.len(),
            reencoded.len()
        );
    }
    Ok(())
}

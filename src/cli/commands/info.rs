//! CLI command for inspecting CM3D2 files

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, bail};

use crate::formats::common::read_string;
use crate::formats::menu::{Menu, MENU_SIGNATURE, parse_menu_bytes};
use crate::formats::model::{MODEL_SIGNATURE, Model, parse_model_bytes};

pub fn execute(source: &Path, json: bool) -> anyhow::Result<()> {
    let bytes = std::fs::read(source)
        .with_context(|| format!("failed to read {}", source.display()))?;

    let magic = read_string(&mut Cursor::new(bytes.as_slice()))
        .with_context(|| format!("{} has no readable signature", source.display()))?;

    match magic.as_str() {
        MODEL_SIGNATURE => {
            let model = parse_model_bytes(&bytes)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&model)?);
            } else {
                print_model_summary(&model);
            }
        }
        MENU_SIGNATURE => {
            let result = parse_menu_bytes(&bytes)?;
            for warning in &result.warnings {
                eprintln!("warning: {warning}");
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&result.menu)?);
            } else {
                print_menu_summary(&result.menu);
            }
        }
        other => bail!("unrecognized signature {other:?} in {}", source.display()),
    }
    Ok(())
}

fn print_model_summary(model: &Model) {
    println!("MODEL v{}: {}", model.version, model.name);
    println!("  base bone:  {}", model.base_bone);
    println!("  bones:      {}", model.bones.len());
    println!("  skin bones: {}", model.skin_bones.len());
    println!("  vertices:   {}", model.vertices.len());
    println!(
        "  submeshes:  {} ({} triangles)",
        model.submeshes.len(),
        model.triangle_count()
    );
    for material in &model.materials {
        println!(
            "  material:   {} [{}] ({} properties)",
            material.name,
            material.shader1,
            material.properties.len()
        );
    }
    for morph in &model.morphs {
        println!("  morph:      {} ({} deltas)", morph.name, morph.deltas.len());
    }
}

fn print_menu_summary(menu: &Menu) {
    println!("MENU v{}: {}", menu.version, menu.name);
    println!("  path:        {}", menu.path);
    println!("  category:    {}", menu.category);
    println!("  description: {}", menu.description);
    println!("  commands:    {}", menu.commands.len());
    for (i, command) in menu.commands.iter().enumerate() {
        println!("  {i:3}  {}", command.display_name());
    }
}

//! `.model` file writing

#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use std::path::Path;

use super::{MaterialProperty, Model, MODEL_SIGNATURE, MODEL_VERSION_BONE_SCALE};
use crate::error::{Error, Result};
use crate::formats::common::{
    write_f32, write_f32_array, write_i32, write_mat4, write_string, write_u16, write_u8,
};

/// Write a `.model` file to disk
///
/// The full stream is serialized in memory first so a failure never
/// leaves a truncated file behind.
pub fn write_model<P: AsRef<Path>>(path: P, model: &Model) -> Result<()> {
    let bytes = serialize_model(model)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Serialize a model to bytes
///
/// Mirrors [`parse_model_bytes`] section for section. The read-discarded
/// extra float-quads re-encode as a zero count, and each material's
/// property list and the morph section are closed with an `end` tag.
///
/// # Errors
///
/// Returns [`Error::SubmeshMaterialMismatch`] if the submesh and material
/// tables do not pair up, and [`Error::InvalidBoneParent`] on a parent
/// index outside the bone table.
///
/// [`parse_model_bytes`]: super::parse_model_bytes
pub fn serialize_model(model: &Model) -> Result<Vec<u8>> {
    if model.submeshes.len() != model.materials.len() {
        return Err(Error::SubmeshMaterialMismatch {
            submeshes: model.submeshes.len(),
            materials: model.materials.len(),
        });
    }

    let mut out = Vec::new();
    write_string(&mut out, MODEL_SIGNATURE)?;
    write_i32(&mut out, model.version)?;
    write_string(&mut out, &model.name)?;
    write_string(&mut out, &model.base_bone)?;

    write_bone_table(&mut out, model)?;

    write_i32(&mut out, model.vertices.len() as i32)?;
    write_i32(&mut out, model.submeshes.len() as i32)?;
    write_i32(&mut out, model.skin_bones.len() as i32)?;

    for skin_bone in &model.skin_bones {
        write_string(&mut out, &skin_bone.name)?;
    }
    for skin_bone in &model.skin_bones {
        write_mat4(&mut out, &skin_bone.bind_matrix)?;
    }

    for vertex in &model.vertices {
        write_f32_array(&mut out, &vertex.position)?;
        write_f32_array(&mut out, &vertex.normal)?;
        write_f32_array(&mut out, &vertex.uv)?;
    }
    write_i32(&mut out, 0)?; // discarded forward-compat quads
    for vertex in &model.vertices {
        for slot in &vertex.weights {
            write_u16(&mut out, slot.bone_index)?;
        }
        for slot in &vertex.weights {
            write_f32(&mut out, slot.weight)?;
        }
    }

    for submesh in &model.submeshes {
        write_i32(&mut out, (submesh.triangles.len() * 3) as i32)?;
        for &[a, b, c] in &submesh.triangles {
            // back to the reversed wire winding
            write_u16(&mut out, c)?;
            write_u16(&mut out, b)?;
            write_u16(&mut out, a)?;
        }
    }

    write_i32(&mut out, model.materials.len() as i32)?;
    for material in &model.materials {
        write_string(&mut out, &material.name)?;
        write_string(&mut out, &material.shader1)?;
        write_string(&mut out, &material.shader2)?;
        for property in &material.properties {
            write_property(&mut out, property)?;
        }
        write_string(&mut out, "end")?;
    }

    for morph in &model.morphs {
        write_string(&mut out, "morph")?;
        write_string(&mut out, &morph.name)?;
        write_i32(&mut out, morph.deltas.len() as i32)?;
        for delta in &morph.deltas {
            write_u16(&mut out, delta.vertex)?;
            write_f32_array(&mut out, &delta.position)?;
            write_f32_array(&mut out, &delta.normal)?;
        }
    }
    write_string(&mut out, "end")?;

    Ok(out)
}

fn write_bone_table(out: &mut Vec<u8>, model: &Model) -> Result<()> {
    let count = model.bones.len();
    write_i32(out, count as i32)?;
    for bone in &model.bones {
        write_string(out, &bone.name)?;
        write_u8(out, bone.flag)?;
    }
    for bone in &model.bones {
        if bone.parent_index != -1
            && usize::try_from(bone.parent_index)
                .ok()
                .filter(|&i| i < count)
                .is_none()
        {
            return Err(Error::InvalidBoneParent {
                bone: bone.name.clone(),
                index: bone.parent_index,
            });
        }
        write_i32(out, bone.parent_index)?;
    }
    for bone in &model.bones {
        write_f32_array(out, &bone.position)?;
        write_f32_array(out, &bone.rotation)?;
        if model.version >= MODEL_VERSION_BONE_SCALE {
            match bone.scale {
                Some(scale) => {
                    write_u8(out, 1)?;
                    write_f32_array(out, &scale)?;
                }
                None => write_u8(out, 0)?,
            }
        }
    }
    Ok(())
}

fn write_property(out: &mut Vec<u8>, property: &MaterialProperty) -> Result<()> {
    match property {
        MaterialProperty::Texture {
            slot,
            kind,
            reference,
        } => {
            write_string(out, "tex")?;
            write_string(out, slot)?;
            write_string(out, kind)?;
            match (kind.as_str(), reference) {
                ("tex2d", Some(tex)) => {
                    write_string(out, &tex.name)?;
                    write_string(out, &tex.path)?;
                    write_f32_array(out, &tex.transform)?;
                }
                ("tex2d", None) => {
                    return Err(Error::InvalidFormat(format!(
                        "tex2d property '{slot}' has no texture reference"
                    )));
                }
                (_, Some(_)) => {
                    return Err(Error::InvalidFormat(format!(
                        "texture property '{slot}' of kind '{kind}' cannot carry a reference"
                    )));
                }
                _ => {}
            }
        }
        MaterialProperty::Color { slot, rgba } => {
            write_string(out, "col")?;
            write_string(out, slot)?;
            write_f32_array(out, rgba)?;
        }
        MaterialProperty::Float { slot, value } => {
            write_string(out, "f")?;
            write_string(out, slot)?;
            write_f32(out, *value)?;
        }
    }
    Ok(())
}

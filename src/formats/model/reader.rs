//! `.model` file reading and parsing

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use super::{
    Bone, Material, MaterialProperty, Model, MorphDelta, MorphTarget, Submesh, SkinBone,
    TextureRef, Vertex, VertexWeight, MODEL_SIGNATURE, MODEL_VERSION_BONE_SCALE,
    WEIGHTS_PER_VERTEX,
};
use crate::error::{Error, Result};
use crate::formats::common::{
    peek_string, read_f32, read_f32_array, read_i32, read_mat4, read_string, read_u16, read_u8,
};

/// Read a `.model` file from disk
///
/// # Errors
///
/// Returns [`Error::InvalidModelMagic`] if the file does not open with the
/// `CM3D2_MESH` signature, [`Error::UnexpectedEof`] on truncation, and
/// [`Error::Io`] if the file cannot be opened or read.
pub fn read_model<P: AsRef<Path>>(path: P) -> Result<Model> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_model_bytes(&buffer)
}

/// Parse `.model` data from bytes
///
/// Sections are strictly sequential: header, bone table, skin-bone table,
/// vertex table, submesh table, material table, morph table. The only
/// lookahead is the single peeked tag that terminates a material's
/// property stream and the morph loop.
pub fn parse_model_bytes(data: &[u8]) -> Result<Model> {
    let mut cursor = Cursor::new(data);

    let magic = read_string(&mut cursor)?;
    if magic != MODEL_SIGNATURE {
        return Err(Error::InvalidModelMagic { found: magic });
    }
    let version = read_i32(&mut cursor)?;
    let name = read_string(&mut cursor)?;
    let base_bone = read_string(&mut cursor)?;

    let bones = read_bone_table(&mut cursor, version)?;
    tracing::debug!("model '{}' v{}: {} bones", name, version, bones.len());

    let vertex_count = table_len(read_i32(&mut cursor)?, "vertex count")?;
    let submesh_count = table_len(read_i32(&mut cursor)?, "submesh count")?;
    let skin_bone_count = table_len(read_i32(&mut cursor)?, "skin bone count")?;

    let skin_bones = read_skin_bone_table(&mut cursor, skin_bone_count)?;
    let vertices = read_vertex_table(&mut cursor, vertex_count, skin_bones.len())?;
    let submeshes = read_submesh_table(&mut cursor, submesh_count)?;
    let materials = read_material_table(&mut cursor)?;
    if materials.len() != submeshes.len() {
        tracing::warn!(
            "material count {} does not match submesh count {}",
            materials.len(),
            submeshes.len()
        );
    }
    let morphs = read_morph_table(&mut cursor)?;

    Ok(Model {
        version,
        name,
        base_bone,
        bones,
        skin_bones,
        vertices,
        submeshes,
        materials,
        morphs,
    })
}

fn table_len(count: i32, what: &str) -> Result<usize> {
    usize::try_from(count).map_err(|_| Error::InvalidFormat(format!("negative {what}: {count}")))
}

/// The bone table is three passes over the same count: names and flags,
/// then parent indices, then local transforms. The passes cannot be fused;
/// the wire interleaves whole tables, not whole bones.
fn read_bone_table<R: Read + Seek>(r: &mut R, version: i32) -> Result<Vec<Bone>> {
    let count = table_len(read_i32(r)?, "bone count")?;

    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let name = read_string(r)?;
        let flag = read_u8(r)?;
        names.push((name, flag));
    }

    let mut parents = Vec::with_capacity(count);
    for (name, _) in &names {
        let parent_index = read_i32(r)?;
        if parent_index != -1 {
            let idx = usize::try_from(parent_index).ok().filter(|&i| i < count);
            if idx.is_none() {
                return Err(Error::InvalidBoneParent {
                    bone: name.clone(),
                    index: parent_index,
                });
            }
        }
        parents.push(parent_index);
    }

    let mut bones = Vec::with_capacity(count);
    for (i, (name, flag)) in names.iter().enumerate() {
        let position = read_f32_array::<_, 3>(r)?;
        let rotation = read_f32_array::<_, 4>(r)?;
        let scale = if version >= MODEL_VERSION_BONE_SCALE && read_u8(r)? != 0 {
            Some(read_f32_array::<_, 3>(r)?)
        } else {
            None
        };
        let parent_index = parents[i];
        let parent_name = if parent_index == -1 {
            None
        } else {
            Some(names[parent_index as usize].0.clone())
        };
        bones.push(Bone {
            name: name.clone(),
            flag: *flag,
            parent_index,
            parent_name,
            position,
            rotation,
            scale,
        });
    }
    Ok(bones)
}

fn read_skin_bone_table<R: Read + Seek>(r: &mut R, count: usize) -> Result<Vec<SkinBone>> {
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        names.push(read_string(r)?);
    }
    let mut skin_bones = Vec::with_capacity(count);
    for name in names {
        let bind_matrix = read_mat4(r)?;
        skin_bones.push(SkinBone { name, bind_matrix });
    }
    Ok(skin_bones)
}

fn read_vertex_table<R: Read + Seek>(
    r: &mut R,
    count: usize,
    skin_bone_count: usize,
) -> Result<Vec<Vertex>> {
    let mut vertices = Vec::with_capacity(count);
    for _ in 0..count {
        vertices.push(Vertex {
            position: read_f32_array(r)?,
            normal: read_f32_array(r)?,
            uv: read_f32_array(r)?,
            weights: [VertexWeight::default(); WEIGHTS_PER_VERTEX],
        });
    }

    // Forward-compatibility padding: declared count of float-quads nothing
    // consumes. Read and discard; re-encoded as a zero count.
    let extra = table_len(read_i32(r)?, "extra quad count")?;
    for _ in 0..extra {
        read_f32_array::<_, 4>(r)?;
    }

    for (vi, vertex) in vertices.iter_mut().enumerate() {
        let mut indices = [0u16; WEIGHTS_PER_VERTEX];
        for idx in &mut indices {
            *idx = read_u16(r)?;
        }
        for (slot, &bone_index) in vertex.weights.iter_mut().zip(&indices) {
            if usize::from(bone_index) >= skin_bone_count {
                return Err(Error::InvalidSkinBoneIndex {
                    vertex: vi,
                    index: bone_index,
                    count: skin_bone_count,
                });
            }
            slot.bone_index = bone_index;
        }
        for slot in &mut vertex.weights {
            slot.weight = read_f32(r)?;
        }
    }
    Ok(vertices)
}

fn read_submesh_table<R: Read + Seek>(r: &mut R, count: usize) -> Result<Vec<Submesh>> {
    let mut submeshes = Vec::with_capacity(count);
    for si in 0..count {
        let index_count = read_i32(r)?;
        if index_count < 0 || index_count % 3 != 0 {
            return Err(Error::RaggedSubmesh {
                submesh: si,
                count: index_count,
            });
        }
        let mut triangles = Vec::with_capacity(index_count as usize / 3);
        for _ in 0..index_count / 3 {
            let a = read_u16(r)?;
            let b = read_u16(r)?;
            let c = read_u16(r)?;
            // wire winding is reversed relative to the engine convention
            triangles.push([c, b, a]);
        }
        submeshes.push(Submesh { triangles });
    }
    Ok(submeshes)
}

fn read_material_table<R: Read + Seek>(r: &mut R) -> Result<Vec<Material>> {
    let count = table_len(read_i32(r)?, "material count")?;
    let mut materials = Vec::with_capacity(count);
    for _ in 0..count {
        let name = read_string(r)?;
        let shader1 = read_string(r)?;
        let shader2 = read_string(r)?;
        let properties = read_property_stream(r)?;
        materials.push(Material {
            name,
            shader1,
            shader2,
            properties,
        });
    }
    Ok(materials)
}

/// Property records run until a tag that is none of `tex`/`col`/`f`.
/// The writer closes each list with an explicit `end`, which is consumed;
/// any other terminator is left in place for the next stage (the peeked
/// string may be the next material's name).
fn read_property_stream<R: Read + Seek>(r: &mut R) -> Result<Vec<MaterialProperty>> {
    let mut properties = Vec::new();
    loop {
        let Some(tag) = peek_string(r)? else {
            break;
        };
        match tag.as_str() {
            "tex" => {
                read_string(r)?;
                let slot = read_string(r)?;
                let kind = read_string(r)?;
                let reference = if kind == "tex2d" {
                    Some(TextureRef {
                        name: read_string(r)?,
                        path: read_string(r)?,
                        transform: read_f32_array(r)?,
                    })
                } else {
                    None
                };
                properties.push(MaterialProperty::Texture {
                    slot,
                    kind,
                    reference,
                });
            }
            "col" => {
                read_string(r)?;
                properties.push(MaterialProperty::Color {
                    slot: read_string(r)?,
                    rgba: read_f32_array(r)?,
                });
            }
            "f" => {
                read_string(r)?;
                properties.push(MaterialProperty::Float {
                    slot: read_string(r)?,
                    value: read_f32(r)?,
                });
            }
            "end" => {
                read_string(r)?;
                break;
            }
            _ => break,
        }
    }
    Ok(properties)
}

fn read_morph_table<R: Read + Seek>(r: &mut R) -> Result<Vec<MorphTarget>> {
    let mut morphs = Vec::new();
    loop {
        match peek_string(r)?.as_deref() {
            Some("morph") => {
                read_string(r)?;
                let name = read_string(r)?;
                let count = table_len(read_i32(r)?, "morph delta count")?;
                let mut deltas = Vec::with_capacity(count);
                for _ in 0..count {
                    deltas.push(MorphDelta {
                        vertex: read_u16(r)?,
                        position: read_f32_array(r)?,
                        normal: read_f32_array(r)?,
                    });
                }
                morphs.push(MorphTarget { name, deltas });
            }
            Some("end") => {
                read_string(r)?;
                break;
            }
            _ => break,
        }
    }
    Ok(morphs)
}

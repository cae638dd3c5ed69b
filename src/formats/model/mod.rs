//! CM3D2 `.model` skinned-mesh format
//!
//! Binary format carrying a skeleton, skinned geometry, materials and
//! morph targets. Sections appear in a fixed order with counts up front
//! and no structural markers beyond them; see [`reader`] for the exact
//! wire layout.

mod reader;
mod writer;

pub use reader::{parse_model_bytes, read_model};
pub use writer::{serialize_model, write_model};

use serde::{Deserialize, Serialize};

/// Magic string opening every `.model` file.
pub const MODEL_SIGNATURE: &str = "CM3D2_MESH";

/// First format version carrying the per-bone has-scale byte.
pub const MODEL_VERSION_BONE_SCALE: i32 = 2001;

/// Weight slots stored per vertex, used or not.
pub const WEIGHTS_PER_VERTEX: usize = 4;

/// A fully decoded `.model` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Format version from the header (gates per-bone scale at 2001+).
    pub version: i32,
    /// Model name.
    pub name: String,
    /// Name of the bone the mesh object is anchored to.
    pub base_bone: String,
    /// Hierarchy bones, wire order. Parents may appear after children.
    pub bones: Vec<Bone>,
    /// Skinning bones, wire order. Vertex weights index into this table.
    pub skin_bones: Vec<SkinBone>,
    pub vertices: Vec<Vertex>,
    /// One submesh per material slot, material-table order.
    pub submeshes: Vec<Submesh>,
    pub materials: Vec<Material>,
    pub morphs: Vec<MorphTarget>,
}

/// One entry of the hierarchy bone table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    /// Engine-side flag byte; carried through untouched.
    pub flag: u8,
    /// Index into the bone table, -1 for roots.
    pub parent_index: i32,
    /// Parent name resolved from `parent_index` at decode time. The
    /// skeleton builder keys on this, not the index.
    pub parent_name: Option<String>,
    pub position: [f32; 3],
    /// Rotation quaternion, wire order x, y, z, w.
    pub rotation: [f32; 4],
    /// Per-bone scale, present only at version 2001+ when the bone's
    /// has-scale byte is set.
    pub scale: Option<[f32; 3]>,
}

/// A skinning bone: referenced by vertex weights, matched to hierarchy
/// bones by name only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinBone {
    pub name: String,
    /// Inverse bind matrix, wire rows.
    pub bind_matrix: [[f32; 4]; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Exactly four slots, zero-weight entries preserved.
    pub weights: [VertexWeight; WEIGHTS_PER_VERTEX],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexWeight {
    /// Index into [`Model::skin_bones`].
    pub bone_index: u16,
    pub weight: f32,
}

/// Triangle list for one material slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submesh {
    /// Vertex-index triples, already flipped to engine winding.
    pub triangles: Vec<[u16; 3]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material name.
    pub name: String,
    /// Shader name, e.g. `CM3D2/Toony_Lighted_Outline`.
    pub shader1: String,
    /// Shader filename variant.
    pub shader2: String,
    /// Ordered property records; order is preserved on round-trip.
    pub properties: Vec<MaterialProperty>,
}

/// One tagged record of a material's property stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaterialProperty {
    /// `tex` record. Only the `tex2d` kind carries a texture reference.
    Texture {
        slot: String,
        /// Sub-kind tag: `tex2d`, `null`, `texRT`.
        kind: String,
        reference: Option<TextureRef>,
    },
    /// `col` record.
    Color { slot: String, rgba: [f32; 4] },
    /// `f` record.
    Float { slot: String, value: f32 },
}

/// Texture payload of a `tex2d` property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureRef {
    pub name: String,
    /// Asset path inside the game's texture tree.
    pub path: String,
    /// UV offset (x, y) and scale (z, w).
    pub transform: [f32; 4],
}

/// A named sparse set of per-vertex deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphTarget {
    pub name: String,
    pub deltas: Vec<MorphDelta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MorphDelta {
    /// Index of the affected vertex.
    pub vertex: u16,
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// Weight slots with a nonzero contribution.
    pub fn active_weights(&self) -> impl Iterator<Item = &VertexWeight> {
        self.weights.iter().filter(|w| w.weight > 0.0)
    }
}

impl Model {
    /// Total triangle count across all submeshes.
    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.triangles.len()).sum()
    }

    /// Look up a hierarchy bone by name.
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }
}

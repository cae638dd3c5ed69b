//! # KissKit
//!
//! A pure-Rust library for working with CM3D2 (Custom Maid 3D 2) file
//! formats.
//!
//! ## Supported Formats
//!
//! - **MODEL** - Skinned meshes with skeleton, materials and morph targets
//! - **MENU** - Ordered command streams assembling in-game outfits
//!
//! ## Quick Start
//!
//! ### Reading a model
//!
//! ```no_run
//! use kisskit::formats::model::read_model;
//! use kisskit::skeleton::{SkeletonOptions, build_skeleton};
//!
//! let model = read_model("dress01.model")?;
//! println!("{} bones, {} vertices", model.bones.len(), model.vertices.len());
//!
//! // Rebuild the bone tree with world transforms
//! let skeleton = build_skeleton(&model.bones, &SkeletonOptions::default())?;
//! # Ok::<(), kisskit::Error>(())
//! ```
//!
//! ### Editing a menu
//!
//! ```no_run
//! use kisskit::formats::menu::{read_menu, write_menu};
//!
//! let mut result = read_menu("dress01.menu")?;
//! for warning in &result.warnings {
//!     eprintln!("{warning}");
//! }
//! result.menu.new_command("additem");
//! write_menu("dress01_edit.menu", &result.menu)?;
//! # Ok::<(), kisskit::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `kisskit` command-line binary

pub mod error;
pub mod formats;
pub mod skeleton;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::menu::{
        AttachPointCommand, ChunkWarning, GenericCommand, Menu, MenuCommand, MenuReadResult,
        PropertyCommand, parse_menu_bytes, read_menu, serialize_menu, write_menu,
        registry::{CommandInfo, PayloadKind},
    };
    pub use crate::formats::model::{
        Bone, Material, MaterialProperty, Model, MorphDelta, MorphTarget, SkinBone, Submesh,
        Vertex, VertexWeight, parse_model_bytes, read_model, serialize_model, write_model,
    };
    pub use crate::skeleton::{Skeleton, SkeletonBone, SkeletonOptions, build_skeleton};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;

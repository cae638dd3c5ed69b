//! File format handlers for KISS CM3D2 formats

pub mod common;
pub mod menu;
pub mod model;

// Re-export main document types
pub use menu::{
    ChunkWarning, Menu, MenuCommand, MenuReadResult, parse_menu_bytes, read_menu, serialize_menu,
    write_menu,
};
pub use model::{Model, parse_model_bytes, read_model, serialize_model, write_model};

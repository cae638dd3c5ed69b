//! Error types for `KissKit`

use thiserror::Error;

/// The error type for `KissKit` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer bytes were available than a just-read length or count demands.
    #[error("unexpected end of stream at byte {offset}")]
    UnexpectedEof {
        /// Byte offset at which the stream ran out.
        offset: u64,
    },

    /// A length-prefixed string was not valid UTF-8.
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A string length prefix exceeded the sanity cap, or a string that
    /// long was handed to the encoder.
    #[error("string length {len} exceeds the {max}-byte limit")]
    StringTooLong {
        /// The declared or actual byte length.
        len: usize,
        /// The enforced maximum.
        max: usize,
    },

    // ==================== MODEL Format Errors ====================
    /// The file is not a valid CM3D2 model file (missing `CM3D2_MESH` magic).
    #[error("invalid model magic: expected CM3D2_MESH, found {found:?}")]
    InvalidModelMagic {
        /// The string found where the magic was expected.
        found: String,
    },

    /// A bone's parent index points outside the bone table.
    #[error("bone '{bone}' has out-of-range parent index {index}")]
    InvalidBoneParent {
        /// The bone whose parent reference is broken.
        bone: String,
        /// The out-of-range index.
        index: i32,
    },

    /// A vertex weight references a skin bone outside the skin-bone table.
    #[error("vertex {vertex} references skin bone {index} of {count}")]
    InvalidSkinBoneIndex {
        /// The vertex carrying the bad reference.
        vertex: usize,
        /// The out-of-range skin-bone index.
        index: u16,
        /// The number of skin bones in the table.
        count: usize,
    },

    /// Submesh and material tables must pair up one-to-one for encoding.
    #[error("submesh count {submeshes} does not match material count {materials}")]
    SubmeshMaterialMismatch {
        /// Number of submeshes in the model.
        submeshes: usize,
        /// Number of materials in the model.
        materials: usize,
    },

    /// A submesh index list is not a whole number of triangles.
    #[error("submesh {submesh} index count {count} is not a multiple of 3")]
    RaggedSubmesh {
        /// The submesh position in the table.
        submesh: usize,
        /// The declared index count.
        count: i32,
    },

    // ==================== MENU Format Errors ====================
    /// The file is not a valid CM3D2 menu file (missing `CM3D2_MENU` magic).
    #[error("invalid menu magic: expected CM3D2_MENU, found {found:?}")]
    InvalidMenuMagic {
        /// The string found where the magic was expected.
        found: String,
    },

    /// A command chunk's field list cannot be encoded: the count must fit
    /// in the single length byte the wire format allows.
    #[error("command '{tag}' has {count} fields, limit is 255")]
    TooManyChunkFields {
        /// The chunk's tag.
        tag: String,
        /// The offending field count.
        count: usize,
    },

    // ==================== Skeleton Errors ====================
    /// A bone's parent name never resolved while building the tree.
    #[error("bone '{bone}' references missing parent '{parent}'")]
    DanglingBone {
        /// The orphaned bone.
        bone: String,
        /// The parent name that matches no bone in the table.
        parent: String,
    },

    // ==================== Generic/Fallback Errors ====================
    /// Invalid format error (use specific variants when possible).
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

/// A specialized Result type for `KissKit` operations.
pub type Result<T> = std::result::Result<T, Error>;

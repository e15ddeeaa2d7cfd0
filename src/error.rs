//! Error types for toolpath generation.

use thiserror::Error;

/// Errors that abort a generation request.
///
/// Degenerate triangles and empty layers are not errors: they are skipped
/// where they occur and the rest of the job continues.
#[derive(Error, Debug)]
pub enum CamError {
    /// A settings value failed its range check.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Mesh data is structurally unusable.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// JSON handed across the WebAssembly boundary could not be decoded.
    #[error("malformed input: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for toolpath operations.
pub type Result<T> = std::result::Result<T, CamError>;

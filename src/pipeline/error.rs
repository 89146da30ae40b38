//! Error types
//!
//! Only load-time and session-setup failures are errors. Per-frame problems
//! (missing model, degenerate polygon, batch overflow) are logged and the
//! offending element simply contributes nothing.

use thiserror::Error;

/// Error type for model loading and validation
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("polygon {polygon}: vertex index {index} out of range ({vertex_count} vertices)")]
    IndexOutOfRange {
        polygon: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("polygon {polygon}: {uvs} texture coordinates for {indices} vertices")]
    UvCountMismatch {
        polygon: usize,
        uvs: usize,
        indices: usize,
    },
    #[error("too many vertices ({count} > {max})")]
    TooManyVertices { count: usize, max: usize },
    #[error("too many polygons ({count} > {max})")]
    TooManyPolygons { count: usize, max: usize },
    #[error("{context}: invalid coordinate {value}")]
    InvalidCoordinate { context: String, value: f32 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("decompression failed: {0}")]
    Decompress(String),
    #[error("serialization failed: {0}")]
    Serialize(String),
}

/// Error type for session setup
#[derive(Debug, Error)]
pub enum PipelineError {
    /// GPU backend requested but no GPU resources were provided
    #[error("GPU backend selected but GPU resources are not initialized")]
    GpuUnavailable,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

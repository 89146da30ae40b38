//! Model visibility & transform pipeline for a 3D software/GPU renderer
//!
//! Per frame: transform and light each placed model, cull back faces, clip
//! against the near plane, and depth-sort what is left into a draw list.

pub mod pipeline;
pub mod scene;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

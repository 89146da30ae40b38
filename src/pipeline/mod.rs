//! 3D model visibility & transform pipeline
//!
//! Takes placed model instances and produces what a rasterizer needs for one
//! frame: clipped view-space polygons in back-to-front order (software
//! backends), or an unordered geometry batch (GPU backend).
//!
//! # Module Organization
//!
//! - `fixed` - 16.16 fixed-point numbers
//! - `math` - Vec2, Vec3, Mat3
//! - `scalar` - the `Scalar` trait shared by the fixed and float paths
//! - `camera` - Camera (position + orientation)
//! - `model` - Model, Polygon, loading and validation
//! - `object` - per-frame object instances
//! - `frame` - per-frame scratch buffers and counters
//! - `transform` - transform & lighting
//! - `cull` - backface culling and sort keys
//! - `clip` - near-plane clipping
//! - `draw_list` - draw list types and the depth sorter
//! - `backend` - fixed, float and GPU backends
//! - `config` - session configuration
//! - `session` - `ModelPipeline`, the per-frame entry point

pub mod backend;
pub mod camera;
pub mod clip;
pub mod config;
pub mod constants;
pub mod cull;
pub mod draw_list;
pub mod error;
pub mod fixed;
pub mod frame;
pub mod math;
pub mod model;
pub mod object;
pub mod scalar;
pub mod session;
pub mod transform;

// =============================================================================
// Convenience re-exports for commonly used items
// =============================================================================

pub use backend::{
    create_backend, BackendKind, FixedSoftware, FloatSoftware, GpuBackend, GpuBatch,
    GpuCapabilities, GpuDraw, GpuVertex, RenderBackend, SoftwareBackend,
};
pub use camera::{Camera, CameraDesc};
pub use clip::{clip_to_near_plane, ClipOutcome, ClipVertex};
pub use config::PipelineConfig;
pub use constants::NEAR_PLANE;
pub use cull::{backface_cull, polygon_facing, Facing};
pub use draw_list::{DrawList, DrawPolygon, DrawSink, DrawVertex, SortedDrawList};
pub use error::{ModelError, PipelineError};
pub use fixed::Fixed32;
pub use frame::FrameStats;
pub use math::{Mat3, Vec2, Vec3};
pub use model::{MaterialId, Model, ModelData, Polygon, PolygonShading};
pub use object::{ObjectHandle, ObjectInstance, ObjectTransform, PortalInfo};
pub use scalar::{Scalar, ViewTransform, ViewVec3};
pub use session::ModelPipeline;
pub use transform::transform_and_light;

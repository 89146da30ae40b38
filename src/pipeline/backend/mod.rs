//! Rendering backends
//!
//! Every backend accepts the same submissions; they differ in what they do
//! with them:
//!
//! - `software` - transform, cull, clip and depth-sort, in 16.16 fixed-point
//!   ([`FixedSoftware`]) or f32 ([`FloatSoftware`])
//! - `gpu` - transform and batch only; the depth buffer handles visibility
//!
//! The backend is chosen once per session from [`PipelineConfig`].

pub mod gpu;
pub mod software;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::config::PipelineConfig;
use super::draw_list::DrawList;
use super::error::PipelineError;
use super::fixed::Fixed32;
use super::frame::FrameStats;
use super::model::Model;
use super::object::ObjectInstance;

pub use gpu::{GpuBackend, GpuBatch, GpuCapabilities, GpuDraw, GpuVertex};
pub use software::{FixedSoftware, FloatSoftware, SoftwareBackend};

/// Which backend a session renders with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// 16.16 fixed-point software renderer (bit-exact legacy output)
    #[default]
    FixedSoftware,
    /// f32 software renderer
    FloatSoftware,
    /// Hardware rasterization
    Gpu,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::FixedSoftware => "fixed",
            BackendKind::FloatSoftware => "float",
            BackendKind::Gpu => "gpu",
        }
    }

    pub fn is_software(self) -> bool {
        !matches!(self, BackendKind::Gpu)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "fixed-software" => Ok(BackendKind::FixedSoftware),
            "float" | "float-software" => Ok(BackendKind::FloatSoftware),
            "gpu" => Ok(BackendKind::Gpu),
            other => Err(format!("unknown backend '{}' (expected fixed, float or gpu)", other)),
        }
    }
}

/// The submission contract shared by all backends
pub trait RenderBackend: Send {
    fn kind(&self) -> BackendKind;

    /// Start accumulating a new frame seen from `camera`.
    /// Anything queued and not yet finished is dropped.
    fn begin_frame(&mut self, camera: &Camera);

    /// Queue one object instance. Never fails; a bad object contributes nothing.
    fn add(&mut self, instance: &ObjectInstance, model: &Model);

    /// Hand over everything queued since `begin_frame` and reset.
    fn finish(&mut self) -> DrawList;

    /// Counters for the frame in progress
    fn stats(&self) -> FrameStats;

    /// An empty list of this backend's shape
    fn empty_list(&self) -> DrawList {
        if self.kind().is_software() {
            DrawList::Sorted(Vec::new())
        } else {
            DrawList::Batched(GpuBatch::default())
        }
    }
}

/// Build the backend named by `config`.
///
/// Selecting the GPU backend without GPU resources is a setup error; there
/// is no fallback to software.
pub fn create_backend(config: &PipelineConfig) -> Result<Box<dyn RenderBackend>, PipelineError> {
    config.validate()?;
    let backend: Box<dyn RenderBackend> = match config.backend {
        BackendKind::FixedSoftware => Box::new(FixedSoftware::new(Fixed32::from_f32(config.near_plane))),
        BackendKind::FloatSoftware => Box::new(FloatSoftware::new(config.near_plane)),
        BackendKind::Gpu => {
            let caps = config.gpu.ok_or(PipelineError::GpuUnavailable)?;
            Box::new(GpuBackend::new(caps))
        }
    };
    Ok(backend)
}

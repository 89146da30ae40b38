//! Session configuration
//!
//! Stored as RON, e.g.
//!
//! ```text
//! (
//!     backend: FloatSoftware,
//!     near_plane: 0.25,
//!     gpu: None,
//! )
//! ```
//!
//! Missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::backend::{BackendKind, GpuCapabilities};
use super::constants::NEAR_PLANE;
use super::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Backend used for the whole session
    pub backend: BackendKind,
    /// Near-plane distance in view-space units
    pub near_plane: f32,
    /// GPU resources, if the host initialized any
    pub gpu: Option<GpuCapabilities>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::FixedSoftware,
            near_plane: NEAR_PLANE,
            gpu: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    pub fn to_ron_string(&self) -> Result<String, PipelineError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.near_plane.is_finite() || self.near_plane <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "near plane must be a positive distance, got {}",
                self.near_plane
            )));
        }
        if let Some(gpu) = self.gpu {
            if gpu.max_vertices == 0 || gpu.max_indices < 3 {
                return Err(PipelineError::InvalidConfig(format!(
                    "GPU buffers too small ({} vertices, {} indices)",
                    gpu.max_vertices, gpu.max_indices
                )));
            }
        }
        Ok(())
    }
}

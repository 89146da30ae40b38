//! Scene files
//!
//! A scene is a camera plus a list of placed models, stored as RON:
//!
//! ```text
//! (
//!     camera: (position: (x: 0.0, y: 0.0, z: 0.0), yaw: 0.0),
//!     objects: [
//!         (model: Some("crate.ron"), position: (x: 0.0, y: 0.0, z: 10.0), ambient: 0.8),
//!     ],
//! )
//! ```
//!
//! Model paths are relative to the scene file. Each distinct path is loaded
//! once and shared by every object that uses it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::{
    Camera, CameraDesc, Model, ModelError, ModelPipeline, ObjectHandle, ObjectInstance,
    ObjectTransform, PortalInfo, Vec2, Vec3,
};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("model {path:?}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
}

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

/// One placed object as written in the scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Model file; `None` submits the object without geometry
    #[serde(default)]
    pub model: Option<String>,
    pub position: Vec3,
    /// Euler angles in degrees
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_one")]
    pub scale: f32,
    #[serde(default = "default_one")]
    pub ambient: f32,
    #[serde(default)]
    pub floor_offset: Vec2,
    #[serde(default)]
    pub ceil_offset: Vec2,
    #[serde(default)]
    pub portal: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl SceneObject {
    pub fn instance(&self, handle: ObjectHandle) -> ObjectInstance {
        ObjectInstance::new(handle, self.position)
            .with_transform(ObjectTransform::from_euler_degrees(self.rotation, self.scale))
            .with_ambient(self.ambient)
            .with_offsets(self.floor_offset, self.ceil_offset)
            .with_portal(PortalInfo(self.portal))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    #[serde(default)]
    pub camera: CameraDesc,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl SceneDesc {
    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        Ok(ron::from_str(text)?)
    }
}

/// A scene with its models loaded
#[derive(Debug)]
pub struct Scene {
    pub camera: Camera,
    objects: Vec<(ObjectInstance, Option<usize>)>,
    models: Vec<Model>,
}

impl Scene {
    /// Load a scene file and every model it references
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path)?;
        let desc = SceneDesc::from_ron_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_desc(&desc, base)
    }

    /// Resolve `desc` against model files under `base`
    pub fn from_desc(desc: &SceneDesc, base: &Path) -> Result<Self, SceneError> {
        let mut models = Vec::new();
        let mut by_path: HashMap<&str, usize> = HashMap::new();
        let mut objects = Vec::new();

        for (i, obj) in desc.objects.iter().enumerate() {
            if !obj.enabled {
                continue;
            }
            let model = match obj.model.as_deref() {
                Some(name) => Some(match by_path.get(name) {
                    Some(&index) => index,
                    None => {
                        let path = base.join(name);
                        let model = Model::load(&path).map_err(|source| SceneError::Model { path, source })?;
                        log::debug!(
                            "loaded model {} ({} vertices, {} polygons)",
                            model.name(),
                            model.vertex_count(),
                            model.polygon_count()
                        );
                        models.push(model);
                        by_path.insert(name, models.len() - 1);
                        models.len() - 1
                    }
                }),
                None => None,
            };
            objects.push((obj.instance(ObjectHandle(i as u64)), model));
        }

        Ok(Self {
            camera: desc.camera.into(),
            objects,
            models,
        })
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn model_for(&self, handle: ObjectHandle) -> Option<&Model> {
        self.objects
            .iter()
            .find(|(instance, _)| instance.handle == handle)
            .and_then(|(_, model)| model.map(|i| &self.models[i]))
    }

    /// Submit every object to an open frame
    pub fn submit(&self, pipeline: &mut ModelPipeline) {
        for (instance, model) in &self.objects {
            pipeline.add(instance, model.map(|i| &self.models[i]));
        }
    }
}

//! Pipeline session
//!
//! `ModelPipeline` owns the backend chosen at setup and enforces the
//! per-frame protocol:
//!
//! ```text
//! draw_list_clear() -> add()* -> draw_list_finish()
//! ```
//!
//! Nothing here fails per frame. Out-of-protocol calls are logged and
//! ignored, and a missing model contributes nothing.

use super::backend::{create_backend, BackendKind, RenderBackend};
use super::camera::Camera;
use super::config::PipelineConfig;
use super::draw_list::{DrawList, DrawSink};
use super::error::PipelineError;
use super::frame::FrameStats;
use super::model::Model;
use super::object::ObjectInstance;

pub struct ModelPipeline {
    backend: Box<dyn RenderBackend>,
    camera: Camera,
    frame_open: bool,
    /// Objects refused before reaching the backend this frame
    rejected: u32,
    last_stats: FrameStats,
}

impl ModelPipeline {
    /// Set up a session. Fails if the configured backend cannot be built.
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let backend = create_backend(config)?;
        log::info!("model pipeline using {} backend (near plane {})", backend.kind(), config.near_plane);
        Ok(Self::with_backend(backend))
    }

    /// Use an already-built backend
    pub fn with_backend(backend: Box<dyn RenderBackend>) -> Self {
        Self {
            backend,
            camera: Camera::default(),
            frame_open: false,
            rejected: 0,
            last_stats: FrameStats::default(),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Camera for the next frame; takes effect at `draw_list_clear`
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn is_frame_open(&self) -> bool {
        self.frame_open
    }

    /// Begin a new frame. Safe to call repeatedly.
    pub fn draw_list_clear(&mut self) {
        if self.frame_open && self.backend.stats().objects > 0 {
            log::warn!("draw list cleared with an unfinished frame; discarding it");
        }
        self.backend.begin_frame(&self.camera);
        self.frame_open = true;
        self.rejected = 0;
    }

    /// Submit one object for this frame
    pub fn add(&mut self, instance: &ObjectInstance, model: Option<&Model>) {
        if !self.frame_open {
            log::warn!("object {:?} added outside a frame; ignored", instance.handle);
            return;
        }
        let Some(model) = model else {
            log::warn!("object {:?} has no model; skipped", instance.handle);
            self.rejected += 1;
            return;
        };
        self.backend.add(instance, model);
    }

    /// End the frame and hand back its draw list.
    /// Without an open frame this is a no-op returning an empty list.
    pub fn draw_list_finish(&mut self) -> DrawList {
        if !self.frame_open {
            return self.backend.empty_list();
        }

        let mut stats = self.backend.stats();
        stats.objects += self.rejected;
        stats.rejected_objects += self.rejected;
        log::debug!("frame finished ({}): {}", self.backend.kind(), stats);

        let list = self.backend.finish();
        self.last_stats = stats;
        self.frame_open = false;
        self.rejected = 0;
        list
    }

    /// Finish the frame into a rasterizer-side consumer
    pub fn finish_into<D: DrawSink + ?Sized>(&mut self, sink: &mut D) {
        let list = self.draw_list_finish();
        sink.consume(list);
    }

    /// Counters from the most recently finished frame
    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::backend::GpuCapabilities;
    use crate::pipeline::cull::Facing;
    use crate::pipeline::math::Vec3;
    use crate::pipeline::model::Polygon;
    use crate::pipeline::object::ObjectHandle;

    fn pipeline(backend: BackendKind) -> ModelPipeline {
        let config = PipelineConfig {
            backend,
            gpu: Some(GpuCapabilities::default()),
            ..PipelineConfig::default()
        };
        let mut pipeline = ModelPipeline::new(&config).unwrap();
        pipeline.set_camera(Camera::looking_down_z(Vec3::ZERO));
        pipeline
    }

    fn triangle() -> Model {
        let vertices = vec![
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        Model::new(vertices, vec![Polygon::new(vec![0, 1, 2], Vec3::new(0.0, 0.0, -1.0))]).unwrap()
    }

    fn instance(handle: u64, z: f32) -> ObjectInstance {
        ObjectInstance::new(ObjectHandle(handle), Vec3::new(0.0, 0.0, z))
    }

    #[test]
    fn test_frame_scenario_on_every_backend() {
        let model = triangle();
        for kind in [BackendKind::FixedSoftware, BackendKind::FloatSoftware, BackendKind::Gpu] {
            let mut pipeline = pipeline(kind);
            pipeline.draw_list_clear();
            pipeline.add(&instance(1, 10.0), Some(&model));
            pipeline.add(&instance(2, 5.0), Some(&model));
            let list = pipeline.draw_list_finish();

            assert_eq!(list.len(), 2, "{} backend", kind);
            if kind.is_software() {
                let keys: Vec<f32> = list.polygons().iter().map(|p| p.sort_key).collect();
                assert_eq!(keys, vec![10.0, 5.0]);
                assert!(list.polygons().iter().all(|p| p.facing == Facing::Front));
            } else {
                assert_eq!(list.batch().map(|b| b.draws.len()), Some(2));
            }
            assert_eq!(pipeline.last_frame_stats().objects, 2);
        }
    }

    #[test]
    fn test_clear_is_idempotent() {
        let model = triangle();
        let mut pipeline = pipeline(BackendKind::FloatSoftware);
        pipeline.draw_list_clear();
        pipeline.draw_list_clear();
        pipeline.add(&instance(1, 3.0), Some(&model));
        pipeline.draw_list_clear();
        assert!(pipeline.draw_list_finish().is_empty());
    }

    #[test]
    fn test_finish_without_frame_is_empty() {
        let model = triangle();
        let mut pipeline = pipeline(BackendKind::FixedSoftware);
        pipeline.draw_list_clear();
        pipeline.add(&instance(1, 3.0), Some(&model));
        assert_eq!(pipeline.draw_list_finish().len(), 1);
        assert!(pipeline.draw_list_finish().is_empty());
        assert!(!pipeline.is_frame_open());
    }

    #[test]
    fn test_add_outside_frame_is_ignored() {
        let model = triangle();
        let mut pipeline = pipeline(BackendKind::FloatSoftware);
        pipeline.add(&instance(1, 3.0), Some(&model));
        pipeline.draw_list_clear();
        assert!(pipeline.draw_list_finish().is_empty());
        assert_eq!(pipeline.last_frame_stats().objects, 0);
    }

    #[test]
    fn test_missing_model_contributes_nothing() {
        let model = triangle();
        let mut pipeline = pipeline(BackendKind::FixedSoftware);
        pipeline.draw_list_clear();
        pipeline.add(&instance(1, 3.0), None);
        pipeline.add(&instance(2, 4.0), Some(&model));
        let list = pipeline.draw_list_finish();

        assert_eq!(list.len(), 1);
        assert_eq!(list.polygons()[0].object, ObjectHandle(2));
        let stats = pipeline.last_frame_stats();
        assert_eq!(stats.objects, 2);
        assert_eq!(stats.rejected_objects, 1);
    }

    #[test]
    fn test_empty_model_contributes_nothing() {
        let mut pipeline = pipeline(BackendKind::Gpu);
        pipeline.draw_list_clear();
        pipeline.add(&instance(1, 3.0), Some(&Model::empty()));
        assert!(pipeline.draw_list_finish().is_empty());
    }

    #[test]
    fn test_finish_into_sink() {
        let model = triangle();
        let mut pipeline = pipeline(BackendKind::FloatSoftware);
        let mut sink: Vec<DrawList> = Vec::new();
        for z in [2.0, 4.0] {
            pipeline.draw_list_clear();
            pipeline.add(&instance(1, z), Some(&model));
            pipeline.finish_into(&mut sink);
        }
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].polygons()[0].sort_key, 4.0);
    }

    #[test]
    fn test_camera_applies_from_next_clear() {
        let model = triangle();
        let mut pipeline = pipeline(BackendKind::FloatSoftware);
        pipeline.draw_list_clear();

        let moved = Camera::looking_down_z(Vec3::new(0.0, 0.0, -4.0));
        pipeline.set_camera(moved.clone());
        assert_eq!(pipeline.camera(), &moved);

        // The open frame keeps the camera it started with
        pipeline.add(&instance(1, 6.0), Some(&model));
        assert_eq!(pipeline.draw_list_finish().polygons()[0].sort_key, 6.0);

        pipeline.draw_list_clear();
        pipeline.add(&instance(1, 6.0), Some(&model));
        assert_eq!(pipeline.draw_list_finish().polygons()[0].sort_key, 10.0);
    }

    #[test]
    fn test_gpu_requires_resources() {
        let config = PipelineConfig {
            backend: BackendKind::Gpu,
            ..PipelineConfig::default()
        };
        assert!(matches!(ModelPipeline::new(&config), Err(PipelineError::GpuUnavailable)));
    }
}

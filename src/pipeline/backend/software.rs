//! Software backends
//!
//! Runs the full pipeline for each object:
//! transform & light -> backface cull -> near-plane clip -> depth-sorted draw list.
//!
//! The same code serves both numeric variants. `FixedSoftware` does every
//! step in 16.16 fixed-point and is reproducible bit-for-bit;
//! `FloatSoftware` uses f32.

use super::{BackendKind, RenderBackend};
use crate::pipeline::camera::Camera;
use crate::pipeline::clip::{clip_to_near_plane, ClipOutcome, ClipVertex};
use crate::pipeline::cull::{backface_cull, Facing};
use crate::pipeline::draw_list::{DrawList, DrawPolygon, DrawVertex, SortedDrawList};
use crate::pipeline::fixed::Fixed32;
use crate::pipeline::frame::{FrameContext, FrameStats};
use crate::pipeline::math::Vec2;
use crate::pipeline::model::{Model, PolygonShading};
use crate::pipeline::object::ObjectInstance;
use crate::pipeline::scalar::{Scalar, ViewTransform};
use crate::pipeline::transform::transform_and_light;

/// Software pipeline over scalar `S`
#[derive(Debug)]
pub struct SoftwareBackend<S: Scalar> {
    near_plane: S,
    camera: Camera,
    context: FrameContext<S>,
    draw_list: SortedDrawList<S>,
    stats: FrameStats,
}

/// Legacy 16.16 fixed-point renderer
pub type FixedSoftware = SoftwareBackend<Fixed32>;

/// Floating-point renderer
pub type FloatSoftware = SoftwareBackend<f32>;

impl<S: Scalar> SoftwareBackend<S> {
    pub fn new(near_plane: S) -> Self {
        Self {
            near_plane,
            camera: Camera::default(),
            context: FrameContext::new(),
            draw_list: SortedDrawList::new(),
            stats: FrameStats::default(),
        }
    }
}

impl<S: Scalar> RenderBackend for SoftwareBackend<S> {
    fn kind(&self) -> BackendKind {
        if std::any::TypeId::of::<S>() == std::any::TypeId::of::<Fixed32>() {
            BackendKind::FixedSoftware
        } else {
            BackendKind::FloatSoftware
        }
    }

    fn begin_frame(&mut self, camera: &Camera) {
        self.camera = camera.clone();
        self.draw_list.clear();
        self.stats = FrameStats::default();
    }

    fn add(&mut self, instance: &ObjectInstance, model: &Model) {
        let Self {
            near_plane,
            camera,
            context,
            draw_list,
            stats,
        } = self;

        stats.objects += 1;
        if model.is_empty() {
            return;
        }

        // Refuse objects whose view-space coordinates would not fit in `S`
        let reach = (instance.position - camera.position).len()
            + model.radius() * instance.transform.matrix.max_stretch();
        if reach.is_nan() || reach > S::VIEW_RANGE {
            log::warn!(
                "object {:?} ({}) reaches {} units from the eye, beyond the {} unit range; skipped",
                instance.handle,
                model.name(),
                reach,
                S::VIEW_RANGE
            );
            stats.rejected_objects += 1;
            return;
        }

        // === TRANSFORM PHASE ===
        let view = ViewTransform::<S>::compose(camera, &instance.transform.matrix, instance.position);
        context.begin_object(model.vertex_count(), model.polygon_count());
        transform_and_light(model, &view, instance.ambient, &mut context.transform);

        // === CULL PHASE ===
        let survivors = backface_cull(model, &context.transform, &mut context.visible, stats);

        // === CLIP PHASE ===
        let FrameContext {
            transform,
            visible,
            clip_in,
            clip_out,
        } = context;

        let mut emitted = 0usize;
        for vis in visible.iter() {
            let polygon = &model.polygons()[vis.polygon];

            clip_in.clear();
            clip_in.extend(polygon.indices.iter().enumerate().map(|(k, &index)| {
                let uv = polygon.uvs.get(k).copied().unwrap_or(Vec2::ZERO);
                ClipVertex::new(transform.vertices[index as usize], S::from_f32(uv.x), S::from_f32(uv.y))
            }));

            let clipped = match clip_to_near_plane(clip_in, *near_plane, clip_out) {
                ClipOutcome::Outside => {
                    stats.behind_near_plane += 1;
                    continue;
                }
                ClipOutcome::Clipped => {
                    stats.clipped += 1;
                    true
                }
                ClipOutcome::Inside => false,
            };

            // Plane polygons above the eye (view Y runs down) use the ceiling offset
            let plane_offset = (polygon.shading == PolygonShading::Plane).then(|| {
                let reference = transform.vertices[polygon.indices[1] as usize];
                if reference.y < S::ZERO {
                    instance.ceil_offset
                } else {
                    instance.floor_offset
                }
            });

            // === SORT PHASE (queue) ===
            draw_list.push(
                vis.sort_key,
                DrawPolygon {
                    object: instance.handle,
                    polygon: vis.polygon,
                    material: polygon.material,
                    shading: polygon.shading,
                    vertices: clip_out
                        .iter()
                        .map(|v| DrawVertex {
                            position: v.pos.to_vec3(),
                            uv: Vec2::new(v.u.to_f32(), v.v.to_f32()),
                        })
                        .collect(),
                    sort_key: vis.sort_key.to_f32(),
                    intensity: transform.intensities[vis.polygon],
                    facing: Facing::Front,
                    clipped,
                    plane_offset,
                    portal: instance.portal,
                    sequence: 0,
                },
            );
            emitted += 1;
        }
        stats.emitted += emitted as u32;

        log::trace!(
            "object {:?} ({}): {} of {} polygons front-facing, {} emitted",
            instance.handle,
            model.name(),
            survivors,
            model.polygon_count(),
            emitted
        );
    }

    fn finish(&mut self) -> DrawList {
        DrawList::Sorted(self.draw_list.finish())
    }

    fn stats(&self) -> FrameStats {
        self.stats
    }
}

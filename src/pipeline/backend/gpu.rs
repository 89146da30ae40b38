//! GPU backend
//!
//! Transform only. Each object's view-space geometry is fan-triangulated
//! straight into one vertex/index batch for the frame; the hardware depth
//! buffer resolves visibility, so nothing is culled, clipped or sorted here.
//! Callers must not rely on the order of `draws`.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::{BackendKind, RenderBackend};
use crate::pipeline::camera::Camera;
use crate::pipeline::draw_list::DrawList;
use crate::pipeline::frame::{FrameStats, TransformBuffer};
use crate::pipeline::math::Vec2;
use crate::pipeline::model::Model;
use crate::pipeline::object::{ObjectHandle, ObjectInstance, PortalInfo};
use crate::pipeline::scalar::ViewTransform;
use crate::pipeline::transform::transform_and_light;

/// Buffer limits of the GPU resources the session was set up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuCapabilities {
    pub max_vertices: usize,
    pub max_indices: usize,
}

impl Default for GpuCapabilities {
    fn default() -> Self {
        Self {
            max_vertices: 65_536,
            max_indices: 196_608,
        }
    }
}

/// Upload-ready vertex (28 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    /// View-space position
    pub position: [f32; 3],
    pub uv: [f32; 2],
    /// Ambient level of the owning object
    pub intensity: f32,
    /// Material handle, `NO_MATERIAL` if untextured
    pub material: u32,
}

impl GpuVertex {
    pub const NO_MATERIAL: u32 = u32::MAX;
}

/// One object's slice of the batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuDraw {
    pub object: ObjectHandle,
    pub first_vertex: u32,
    pub first_index: u32,
    pub index_count: u32,
    pub ambient: f32,
    pub floor_offset: Vec2,
    pub ceil_offset: Vec2,
    pub portal: PortalInfo,
}

/// Everything submitted to the GPU path in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuBatch {
    pub vertices: Vec<GpuVertex>,
    pub indices: Vec<u32>,
    pub draws: Vec<GpuDraw>,
}

impl GpuBatch {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[derive(Debug)]
pub struct GpuBackend {
    caps: GpuCapabilities,
    camera: Camera,
    buffer: TransformBuffer<f32>,
    batch: GpuBatch,
    stats: FrameStats,
}

impl GpuBackend {
    pub fn new(caps: GpuCapabilities) -> Self {
        Self {
            caps,
            camera: Camera::default(),
            buffer: TransformBuffer::new(),
            batch: GpuBatch::default(),
            stats: FrameStats::default(),
        }
    }
}

impl RenderBackend for GpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn begin_frame(&mut self, camera: &Camera) {
        self.camera = camera.clone();
        self.batch = GpuBatch::default();
        self.stats = FrameStats::default();
    }

    fn add(&mut self, instance: &ObjectInstance, model: &Model) {
        self.stats.objects += 1;
        if model.is_empty() {
            return;
        }

        // Size the object before touching the batch so an overflow leaves it intact
        let (vertex_count, index_count) = model
            .polygons()
            .iter()
            .filter(|p| p.indices.len() >= 3)
            .fold((0, 0), |(v, i), p| (v + p.indices.len(), i + (p.indices.len() - 2) * 3));

        if self.batch.vertices.len() + vertex_count > self.caps.max_vertices
            || self.batch.indices.len() + index_count > self.caps.max_indices
        {
            log::warn!(
                "GPU batch full: skipping object {:?} ({}, {} vertices, {} indices)",
                instance.handle,
                model.name(),
                vertex_count,
                index_count
            );
            self.stats.rejected_objects += 1;
            return;
        }

        let view = ViewTransform::<f32>::compose(&self.camera, &instance.transform.matrix, instance.position);
        transform_and_light(model, &view, instance.ambient, &mut self.buffer);

        let first_vertex = self.batch.vertices.len() as u32;
        let first_index = self.batch.indices.len() as u32;

        for (i, polygon) in model.polygons().iter().enumerate() {
            self.stats.polygons += 1;
            if polygon.indices.len() < 3 {
                self.stats.degenerate += 1;
                continue;
            }

            let base = self.batch.vertices.len() as u32;
            let material = polygon.material.map_or(GpuVertex::NO_MATERIAL, |m| m.0);
            let intensity = self.buffer.intensities[i];

            for (k, &index) in polygon.indices.iter().enumerate() {
                let position = self.buffer.vertices[index as usize];
                let uv = polygon.uvs.get(k).copied().unwrap_or(Vec2::ZERO);
                self.batch.vertices.push(GpuVertex {
                    position: [position.x, position.y, position.z],
                    uv: [uv.x, uv.y],
                    intensity,
                    material,
                });
            }

            // Triangle fan around the first corner
            for k in 1..polygon.indices.len() as u32 - 1 {
                self.batch.indices.extend_from_slice(&[base, base + k, base + k + 1]);
            }
            self.stats.emitted += 1;
        }

        self.batch.draws.push(GpuDraw {
            object: instance.handle,
            first_vertex,
            first_index,
            index_count: self.batch.indices.len() as u32 - first_index,
            ambient: instance.ambient,
            floor_offset: instance.floor_offset,
            ceil_offset: instance.ceil_offset,
            portal: instance.portal,
        });
    }

    fn finish(&mut self) -> DrawList {
        DrawList::Batched(std::mem::take(&mut self.batch))
    }

    fn stats(&self) -> FrameStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::math::Vec3;
    use crate::pipeline::model::{quad_facing_camera, MaterialId, Polygon, PolygonShading};

    fn frame(backend: &mut GpuBackend, objects: &[(u64, Vec3)], model: &Model) -> GpuBatch {
        backend.begin_frame(&Camera::looking_down_z(Vec3::ZERO));
        for &(handle, position) in objects {
            backend.add(&ObjectInstance::new(ObjectHandle(handle), position), model);
        }
        match backend.finish() {
            DrawList::Batched(batch) => batch,
            DrawList::Sorted(_) => panic!("GPU backend produced a sorted list"),
        }
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 28);
        let batch = GpuBatch {
            vertices: vec![GpuVertex::default(); 2],
            indices: vec![0, 1, 1],
            draws: Vec::new(),
        };
        assert_eq!(batch.vertex_bytes().len(), 56);
        assert_eq!(batch.index_bytes().len(), 12);
    }

    #[test]
    fn test_quad_becomes_two_triangles() {
        let model = quad_facing_camera(1.0, 0.0);
        let mut backend = GpuBackend::new(GpuCapabilities::default());
        let batch = frame(&mut backend, &[(4, Vec3::new(0.0, 0.0, 10.0))], &model);

        assert_eq!(batch.vertices.len(), 4);
        assert_eq!(batch.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(batch.triangle_count(), 2);
        assert_eq!(batch.draws.len(), 1);
        assert_eq!(batch.draws[0].object, ObjectHandle(4));
        assert_eq!(batch.draws[0].index_count, 6);
        assert!(batch.vertices.iter().all(|v| v.position[2] == 10.0));
        assert!(batch.vertices.iter().all(|v| v.material == GpuVertex::NO_MATERIAL));
    }

    #[test]
    fn test_no_culling_or_clipping() {
        // Facing away and behind the eye: the software path would drop both
        let vertices = vec![
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        let polygon = Polygon::new(vec![0, 1, 2], Vec3::new(0.0, 0.0, 1.0))
            .with_material(MaterialId(2), PolygonShading::Texture);
        let model = Model::new(vertices, vec![polygon]).unwrap();
        let mut backend = GpuBackend::new(GpuCapabilities::default());
        let batch = frame(&mut backend, &[(1, Vec3::new(0.0, 0.0, 5.0)), (2, Vec3::new(0.0, 0.0, -5.0))], &model);

        assert_eq!(batch.triangle_count(), 2);
        assert_eq!(batch.draws[1].first_vertex, 3);
        assert_eq!(batch.draws[1].first_index, 3);
        assert_eq!(batch.vertices[0].material, 2);
        assert_eq!(backend.stats().back_facing, 0);
    }

    #[test]
    fn test_degenerate_polygons_skipped() {
        let vertices = vec![Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 1.0)];
        let normal = Vec3::new(0.0, 0.0, -1.0);
        let model = Model::new(vertices, vec![Polygon::new(vec![0, 1], normal), Polygon::new(vec![0, 1, 2], normal)]).unwrap();
        let mut backend = GpuBackend::new(GpuCapabilities::default());
        let batch = frame(&mut backend, &[(1, Vec3::ZERO)], &model);
        assert_eq!(batch.vertices.len(), 3);
        assert_eq!(backend.stats().degenerate, 1);
    }

    #[test]
    fn test_overflow_skips_whole_object() {
        let model = quad_facing_camera(1.0, 0.0);
        let caps = GpuCapabilities {
            max_vertices: 6,
            max_indices: 1024,
        };
        let mut backend = GpuBackend::new(caps);
        backend.begin_frame(&Camera::looking_down_z(Vec3::ZERO));
        backend.add(&ObjectInstance::new(ObjectHandle(1), Vec3::new(0.0, 0.0, 4.0)), &model);
        backend.add(&ObjectInstance::new(ObjectHandle(2), Vec3::new(0.0, 0.0, 8.0)), &model);
        assert_eq!(backend.stats().rejected_objects, 1);

        let list = backend.finish();
        let batch = list.batch().unwrap();
        assert_eq!(batch.draws.len(), 1);
        assert_eq!(batch.vertices.len(), 4);
    }

    #[test]
    fn test_finish_twice_is_empty() {
        let model = quad_facing_camera(1.0, 0.0);
        let mut backend = GpuBackend::new(GpuCapabilities::default());
        let batch = frame(&mut backend, &[(1, Vec3::new(0.0, 0.0, 4.0))], &model);
        assert!(!batch.vertices.is_empty());
        assert!(backend.finish().is_empty());
    }
}

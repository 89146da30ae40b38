//! Draw list
//!
//! The frame's output. Software backends produce polygons ordered
//! back-to-front (largest sort key first) so a rasterizer without a depth
//! buffer can paint them in order. The GPU backend produces an unordered
//! vertex/index batch and leaves visibility to the depth test.

use smallvec::SmallVec;

use super::backend::gpu::GpuBatch;
use super::cull::Facing;
use super::math::{Vec2, Vec3};
use super::model::{MaterialId, PolygonShading};
use super::object::{ObjectHandle, PortalInfo};
use super::scalar::Scalar;

/// A view-space vertex ready for projection
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawVertex {
    pub position: Vec3,
    pub uv: Vec2,
}

/// One polygon handed to the software rasterizer
#[derive(Debug, Clone, PartialEq)]
pub struct DrawPolygon {
    pub object: ObjectHandle,
    /// Index of the polygon in its model
    pub polygon: usize,
    pub material: Option<MaterialId>,
    pub shading: PolygonShading,
    /// View-space vertices, all at or beyond the near plane
    pub vertices: SmallVec<[DrawVertex; 6]>,
    /// Mean view-space depth before clipping
    pub sort_key: f32,
    /// Ambient light level of the owning object
    pub intensity: f32,
    pub facing: Facing,
    /// True if the near plane cut this polygon
    pub clipped: bool,
    /// Floor or ceiling texture offset for plane-shaded polygons
    pub plane_offset: Option<Vec2>,
    pub portal: PortalInfo,
    /// Submission order within the frame
    pub sequence: u64,
}

/// A finished frame
#[derive(Debug, Clone, PartialEq)]
pub enum DrawList {
    /// Back-to-front polygons (software backends)
    Sorted(Vec<DrawPolygon>),
    /// Unordered geometry batch (GPU backend)
    Batched(GpuBatch),
}

impl DrawList {
    /// Number of polygons (software) or triangles (GPU)
    pub fn len(&self) -> usize {
        match self {
            DrawList::Sorted(polygons) => polygons.len(),
            DrawList::Batched(batch) => batch.triangle_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted polygons; empty for a GPU batch
    pub fn polygons(&self) -> &[DrawPolygon] {
        match self {
            DrawList::Sorted(polygons) => polygons,
            DrawList::Batched(_) => &[],
        }
    }

    pub fn batch(&self) -> Option<&GpuBatch> {
        match self {
            DrawList::Batched(batch) => Some(batch),
            DrawList::Sorted(_) => None,
        }
    }
}

/// Consumer of finished draw lists (the rasterizer side)
pub trait DrawSink {
    fn consume(&mut self, list: DrawList);
}

impl DrawSink for Vec<DrawList> {
    fn consume(&mut self, list: DrawList) {
        self.push(list);
    }
}

/// Accumulates software-path polygons and orders them at the end of the frame
#[derive(Debug)]
pub struct SortedDrawList<S> {
    entries: Vec<(S, DrawPolygon)>,
    next_sequence: u64,
}

impl<S: Scalar> SortedDrawList<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_sequence: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queue a polygon; it is stamped with the next submission sequence number
    pub fn push(&mut self, sort_key: S, mut polygon: DrawPolygon) {
        polygon.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push((sort_key, polygon));
    }

    /// Farthest first; equal keys keep submission order.
    /// Leaves the builder empty for the next frame.
    pub fn finish(&mut self) -> Vec<DrawPolygon> {
        self.entries.sort_by(|(ka, a), (kb, b)| {
            kb.total_cmp(ka).then(a.sequence.cmp(&b.sequence))
        });
        self.next_sequence = 0;
        self.entries.drain(..).map(|(_, polygon)| polygon).collect()
    }

    /// Drop queued polygons without emitting them
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_sequence = 0;
    }
}

impl<S: Scalar> Default for SortedDrawList<S> {
    fn default() -> Self {
        Self::new()
    }
}

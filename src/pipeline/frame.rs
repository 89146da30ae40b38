//! Per-frame scratch state
//!
//! Owned by a software backend and handed to each stage explicitly. The
//! buffers keep their allocations between objects and frames but their
//! contents are reset before every object, so nothing computed for one
//! object can be seen by the next.

use std::fmt;

use super::clip::ClipVertex;
use super::scalar::{Scalar, ViewVec3};

/// View-space vertices and normals for the object being processed
#[derive(Debug, Default)]
pub struct TransformBuffer<S> {
    /// One per model vertex
    pub vertices: Vec<ViewVec3<S>>,
    /// One per model polygon (rotated, not translated)
    pub normals: Vec<ViewVec3<S>>,
    /// One per model polygon
    pub intensities: Vec<f32>,
}

impl<S: Scalar> TransformBuffer<S> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            intensities: Vec::new(),
        }
    }

    pub fn reset(&mut self, vertex_count: usize, polygon_count: usize) {
        self.vertices.clear();
        self.normals.clear();
        self.intensities.clear();
        self.vertices.reserve(vertex_count);
        self.normals.reserve(polygon_count);
        self.intensities.reserve(polygon_count);
    }
}

/// A polygon that survived backface culling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisiblePolygon<S> {
    /// Index into the model's polygons
    pub polygon: usize,
    /// Mean view-space depth of the polygon's vertices
    pub sort_key: S,
}

/// Scratch buffers for one software backend
#[derive(Debug, Default)]
pub struct FrameContext<S> {
    pub transform: TransformBuffer<S>,
    /// Survivors of culling for the current object
    pub visible: Vec<VisiblePolygon<S>>,
    pub clip_in: Vec<ClipVertex<S>>,
    pub clip_out: Vec<ClipVertex<S>>,
}

impl<S: Scalar> FrameContext<S> {
    pub fn new() -> Self {
        Self {
            transform: TransformBuffer::new(),
            visible: Vec::new(),
            clip_in: Vec::new(),
            clip_out: Vec::new(),
        }
    }

    /// Drop everything computed for the previous object
    pub fn begin_object(&mut self, vertex_count: usize, polygon_count: usize) {
        self.transform.reset(vertex_count, polygon_count);
        self.visible.clear();
        self.clip_in.clear();
        self.clip_out.clear();
    }
}

/// Counters for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Objects submitted
    pub objects: u32,
    /// Submissions dropped (no model, no open frame, batch full)
    pub rejected_objects: u32,
    /// Polygons examined
    pub polygons: u32,
    pub back_facing: u32,
    pub degenerate: u32,
    /// Polygons cut by the near plane
    pub clipped: u32,
    /// Polygons entirely behind the near plane
    pub behind_near_plane: u32,
    /// Polygons written to the draw list
    pub emitted: u32,
}

impl FrameStats {
    pub fn accumulate(&mut self, other: &FrameStats) {
        self.objects += other.objects;
        self.rejected_objects += other.rejected_objects;
        self.polygons += other.polygons;
        self.back_facing += other.back_facing;
        self.degenerate += other.degenerate;
        self.clipped += other.clipped;
        self.behind_near_plane += other.behind_near_plane;
        self.emitted += other.emitted;
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} objects ({} rejected), {} polygons: {} back-facing, {} degenerate, {} clipped, {} behind near plane, {} emitted",
            self.objects,
            self.rejected_objects,
            self.polygons,
            self.back_facing,
            self.degenerate,
            self.clipped,
            self.behind_near_plane,
            self.emitted,
        )
    }
}

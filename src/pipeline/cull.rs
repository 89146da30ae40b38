//! Backface culling
//!
//! Facing is decided in view space, where the eye sits at the origin: the
//! vector from the eye to a polygon is just the position of one of its
//! vertices. A polygon faces the viewer when its normal points back along
//! that vector, i.e. `dot(normal, position) < 0`. Zero (edge-on, or a
//! zero-length normal) counts as back-facing.
//!
//! The polygon's second vertex is the representative point, as in the
//! legacy renderer; for a planar polygon any vertex gives the same sign.

use std::cmp::Ordering;

use smallvec::SmallVec;

use super::frame::{FrameStats, TransformBuffer, VisiblePolygon};
use super::model::Model;
use super::scalar::{Scalar, ViewVec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Front,
    Back,
}

/// Classify a polygon from its view-space normal and a view-space point on it
#[inline]
pub fn polygon_facing<S: Scalar>(normal: ViewVec3<S>, position: ViewVec3<S>) -> Facing {
    match S::dot_sign(normal, position) {
        Ordering::Less => Facing::Front,
        _ => Facing::Back,
    }
}

/// Mean view-space depth of the given vertices
pub fn sort_key<S: Scalar>(indices: &[u32], vertices: &[ViewVec3<S>]) -> S {
    let depths: SmallVec<[S; 8]> = indices.iter().map(|&i| vertices[i as usize].z).collect();
    S::mean(&depths)
}

/// Append every front-facing polygon of `model` to `visible` with its sort key.
///
/// Degenerate polygons are always discarded. Returns the number of survivors.
pub fn backface_cull<S: Scalar>(
    model: &Model,
    buffer: &TransformBuffer<S>,
    visible: &mut Vec<VisiblePolygon<S>>,
    stats: &mut FrameStats,
) -> usize {
    let before = visible.len();

    for (i, polygon) in model.polygons().iter().enumerate() {
        stats.polygons += 1;

        if polygon.is_degenerate() {
            stats.degenerate += 1;
            continue;
        }

        let position = buffer.vertices[polygon.indices[1] as usize];
        if polygon_facing(buffer.normals[i], position) == Facing::Back {
            stats.back_facing += 1;
            continue;
        }

        visible.push(VisiblePolygon {
            polygon: i,
            sort_key: sort_key(&polygon.indices, &buffer.vertices),
        });
    }

    visible.len() - before
}

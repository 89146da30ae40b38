//! Near-plane clipping
//!
//! Sutherland-Hodgman against the single plane `z = near`. Runs after
//! culling (which needs the unclipped polygon) and before any projection
//! (which divides by z).
//!
//! New vertices introduced on cut edges get their position and texture
//! coordinates interpolated by the depth ratio along the edge, and their
//! depth pinned to exactly `near`.

use super::scalar::{Scalar, ViewVec3};

/// A view-space vertex with its texture coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClipVertex<S> {
    pub pos: ViewVec3<S>,
    pub u: S,
    pub v: S,
}

impl<S: Scalar> ClipVertex<S> {
    pub fn new(pos: ViewVec3<S>, u: S, v: S) -> Self {
        Self { pos, u, v }
    }

    fn lerp(self, other: Self, t: S) -> Self {
        Self {
            pos: self.pos.lerp(other.pos, t),
            u: self.u + (other.u - self.u) * t,
            v: self.v + (other.v - self.v) * t,
        }
    }
}

/// What clipping did to a polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOutcome {
    /// Entirely in front of the near plane; output is the input
    Inside,
    /// Straddled the plane; output is the cut polygon
    Clipped,
    /// Entirely behind the near plane (or cut down to nothing); output is empty
    Outside,
}

#[inline]
fn in_front<S: Scalar>(v: &ClipVertex<S>, near: S) -> bool {
    v.pos.z >= near
}

#[inline]
fn behind<S: Scalar>(v: &ClipVertex<S>, near: S) -> bool {
    v.pos.z < near
}

/// Clip a convex polygon against `z = near`, writing the result to `output`.
pub fn clip_to_near_plane<S: Scalar>(
    input: &[ClipVertex<S>],
    near: S,
    output: &mut Vec<ClipVertex<S>>,
) -> ClipOutcome {
    output.clear();

    let inside_count = input.iter().filter(|v| in_front(v, near)).count();
    if inside_count == input.len() {
        output.extend_from_slice(input);
        return ClipOutcome::Inside;
    }
    if inside_count == 0 {
        return ClipOutcome::Outside;
    }

    let n = input.len();
    for i in 0..n {
        let curr = input[i];
        let next = input[(i + 1) % n];

        if in_front(&curr, near) {
            output.push(curr);
        }
        // Cut only edges that pass strictly through the plane. A vertex lying
        // on the plane is already in the output and must not be duplicated.
        let crosses = (curr.pos.z > near && behind(&next, near)) || (behind(&curr, near) && next.pos.z > near);
        if crosses {
            // Depths lie on opposite sides of `near`, so the divisor is non-zero
            let t = (near - curr.pos.z) / (next.pos.z - curr.pos.z);
            let mut cut = curr.lerp(next, t);
            cut.pos.z = near;
            output.push(cut);
        }
    }

    // Only touching the plane leaves a point or a segment
    if output.len() < 3 {
        output.clear();
        return ClipOutcome::Outside;
    }
    ClipOutcome::Clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixed::Fixed32;
    use crate::pipeline::math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn vertex<S: Scalar>(x: f32, y: f32, z: f32) -> ClipVertex<S> {
        ClipVertex::new(ViewVec3::from_vec3(Vec3::new(x, y, z)), S::from_f32(x), S::from_f32(z))
    }

    /// Area of a planar polygon via the cross-product sum
    fn area<S: Scalar>(poly: &[ClipVertex<S>]) -> f32 {
        let mut sum = Vec3::ZERO;
        for i in 0..poly.len() {
            let a = poly[i].pos.to_vec3();
            let b = poly[(i + 1) % poly.len()].pos.to_vec3();
            sum = sum + a.cross(b);
        }
        sum.len() * 0.5
    }

    /// Unit quad in the x/z plane spanning depths `z0..z1`
    fn floor_quad<S: Scalar>(z0: f32, z1: f32) -> Vec<ClipVertex<S>> {
        vec![
            vertex(-1.0, 0.0, z0),
            vertex(1.0, 0.0, z0),
            vertex(1.0, 0.0, z1),
            vertex(-1.0, 0.0, z1),
        ]
    }

    #[test]
    fn test_in_front_is_unchanged() {
        let quad = floor_quad::<f32>(2.0, 4.0);
        let mut out = Vec::new();
        assert_eq!(clip_to_near_plane(&quad, 1.0, &mut out), ClipOutcome::Inside);
        assert_eq!(out, quad);
    }

    #[test]
    fn test_behind_is_dropped() {
        let quad = floor_quad::<f32>(-4.0, -2.0);
        let mut out = vec![vertex(0.0, 0.0, 0.0)];
        assert_eq!(clip_to_near_plane(&quad, 1.0, &mut out), ClipOutcome::Outside);
        assert!(out.is_empty());
    }

    #[test]
    fn test_straddling_quad_is_cut_at_near() {
        let quad = floor_quad::<f32>(-1.0, 3.0);
        let mut out = Vec::new();
        assert_eq!(clip_to_near_plane(&quad, 1.0, &mut out), ClipOutcome::Clipped);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|v| v.pos.z >= 1.0));
        assert!((area(&out) - 4.0).abs() < 1e-5);
        assert!(area(&out) <= area(&quad));
        // Texture coordinate v tracks depth here, so the cut vertices carry v = near
        let cut: Vec<_> = out.iter().filter(|v| v.pos.z == 1.0).collect();
        assert_eq!(cut.len(), 2);
        assert!(cut.iter().all(|v| (v.v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_vertex_touching_plane_is_dropped() {
        // Apex exactly on the plane, the rest behind: nothing visible remains
        let tri = vec![vertex::<f32>(1.0, 1.0, -3.0), vertex(0.0, -1.0, 1.0), vertex(-1.0, 1.0, -3.0)];
        let mut out = Vec::new();
        assert_eq!(clip_to_near_plane(&tri, 1.0, &mut out), ClipOutcome::Outside);
        assert!(out.is_empty());

        // Same for an edge lying on the plane
        let quad = vec![vertex::<Fixed32>(-1.0, 0.0, 1.0), vertex(1.0, 0.0, 1.0), vertex(1.0, 0.0, -2.0), vertex(-1.0, 0.0, -2.0)];
        let mut out = Vec::new();
        assert_eq!(clip_to_near_plane(&quad, Fixed32::ONE, &mut out), ClipOutcome::Outside);
    }

    #[test]
    fn test_vertex_on_plane_is_not_duplicated() {
        // One corner on the plane, two in front, one behind
        let quad = vec![
            vertex::<f32>(0.0, 0.0, 1.0),
            vertex(1.0, 0.0, 3.0),
            vertex(0.0, 0.0, 5.0),
            vertex(-1.0, 0.0, -1.0),
        ];
        let mut out = Vec::new();
        assert_eq!(clip_to_near_plane(&quad, 1.0, &mut out), ClipOutcome::Clipped);
        assert_eq!(out.len(), 4);
        for (i, v) in out.iter().enumerate() {
            assert_ne!(v.pos, out[(i + 1) % out.len()].pos);
        }
    }

    #[test]
    fn test_triangle_with_one_vertex_in_front() {
        let tri = vec![vertex::<Fixed32>(0.0, 0.0, 4.0), vertex(1.0, 0.0, -4.0), vertex(-1.0, 0.0, -4.0)];
        let near = Fixed32::from_int(1);
        let mut out = Vec::new();
        assert_eq!(clip_to_near_plane(&tri, near, &mut out), ClipOutcome::Clipped);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| v.pos.z >= near));
        // Cut at 3/8 of the way along each edge from the front vertex
        assert_eq!(out[1].pos.x, Fixed32::from_f32(0.375));
    }

    #[test]
    fn test_random_polygons_stay_in_front() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut out = Vec::new();
        for _ in 0..200 {
            let z0 = rng.gen_range(-20.0..20.0f32);
            let z1 = rng.gen_range(-20.0..20.0f32);
            let quad = floor_quad::<Fixed32>(z0.min(z1), z0.max(z1));
            let near = Fixed32::from_f32(0.1);
            let before = area(&quad);
            match clip_to_near_plane(&quad, near, &mut out) {
                ClipOutcome::Outside => assert!(out.is_empty()),
                _ => {
                    assert!(out.len() >= 3);
                    assert!(out.iter().all(|v| v.pos.z >= near));
                    assert!(area(&out) <= before + 1e-3);
                }
            }
        }
    }
}

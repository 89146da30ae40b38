//! Numeric backends for the software pipeline
//!
//! The fixed-point and floating-point renderers run the same transform,
//! cull and clip code; only the scalar type differs. `Scalar` is the seam:
//! `f32` for the float renderer, [`Fixed32`] (16.16) for the legacy one.
//!
//! Values enter a backend's scalar once per object (see
//! [`ViewTransform::compose`]) and stay in it until the draw record is
//! written, so the fixed-point path never touches a float in between.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

use super::camera::Camera;
use super::constants::FIXED_VIEW_RANGE;
use super::fixed::Fixed32;
use super::math::{Mat3, Vec3};

/// Arithmetic needed by the view-space stages
pub trait Scalar:
    Copy
    + Default
    + Debug
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    const ZERO: Self;
    const ONE: Self;
    /// Largest view-space distance this scalar can carry through the pipeline
    const VIEW_RANGE: f32;

    fn from_f32(v: f32) -> Self;
    fn to_f32(self) -> f32;

    /// Total order used for depth sorting (NaN-safe for floats)
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Sign of `a · b`.
    ///
    /// Facing depends only on this sign, so implementations should avoid
    /// rounding that could flip it.
    fn dot_sign(a: ViewVec3<Self>, b: ViewVec3<Self>) -> Ordering {
        a.dot(b).partial_cmp(&Self::ZERO).unwrap_or(Ordering::Equal)
    }

    /// Arithmetic mean; zero for an empty input
    fn mean(values: &[Self]) -> Self;
}

impl Scalar for f32 {
    const ZERO: f32 = 0.0;
    const ONE: f32 = 1.0;
    const VIEW_RANGE: f32 = f32::MAX;

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn total_cmp(&self, other: &Self) -> Ordering {
        f32::total_cmp(self, other)
    }

    fn mean(values: &[Self]) -> Self {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f32>() / values.len() as f32
    }
}

impl Scalar for Fixed32 {
    const ZERO: Fixed32 = Fixed32::ZERO;
    const ONE: Fixed32 = Fixed32::ONE;
    const VIEW_RANGE: f32 = FIXED_VIEW_RANGE;

    #[inline]
    fn from_f32(v: f32) -> Self {
        Fixed32::from_f32(v)
    }

    #[inline]
    fn to_f32(self) -> f32 {
        Fixed32::to_f32(self)
    }

    #[inline]
    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Exact: the raw products are summed in 128-bit before taking the sign.
    fn dot_sign(a: ViewVec3<Self>, b: ViewVec3<Self>) -> Ordering {
        let sum = a.x.0 as i128 * b.x.0 as i128
            + a.y.0 as i128 * b.y.0 as i128
            + a.z.0 as i128 * b.z.0 as i128;
        sum.cmp(&0)
    }

    fn mean(values: &[Self]) -> Self {
        if values.is_empty() {
            return Fixed32::ZERO;
        }
        let sum: i64 = values.iter().map(|v| v.0 as i64).sum();
        Fixed32((sum / values.len() as i64) as i32)
    }
}

/// 3D vector in a backend's scalar
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewVec3<S> {
    pub x: S,
    pub y: S,
    pub z: S,
}

impl<S: Scalar> ViewVec3<S> {
    #[inline]
    pub fn new(x: S, y: S, z: S) -> Self {
        Self { x, y, z }
    }

    /// Convert from Vec3 (first and only precision loss for fixed-point)
    #[inline]
    pub fn from_vec3(v: Vec3) -> Self {
        Self {
            x: S::from_f32(v.x),
            y: S::from_f32(v.y),
            z: S::from_f32(v.z),
        }
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x.to_f32(), self.y.to_f32(), self.z.to_f32())
    }

    #[inline]
    pub fn dot(self, other: Self) -> S {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn scale(self, s: S) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// `a + (b - a) * t`
    #[inline]
    pub fn lerp(self, other: Self, t: S) -> Self {
        self + (other - self).scale(t)
    }
}

impl<S: Scalar> Add for ViewVec3<S> {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl<S: Scalar> Sub for ViewVec3<S> {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

/// Combined object-to-view transform: `view = rotation · model + translation`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform<S> {
    pub rotation: [[S; 3]; 3],
    pub translation: ViewVec3<S>,
}

impl<S: Scalar> ViewTransform<S> {
    pub fn identity() -> Self {
        let mut rotation = [[S::ZERO; 3]; 3];
        for (i, row) in rotation.iter_mut().enumerate() {
            row[i] = S::ONE;
        }
        Self {
            rotation,
            translation: ViewVec3::default(),
        }
    }

    pub fn from_mat3(m: &Mat3, translation: ViewVec3<S>) -> Self {
        let mut rotation = [[S::ZERO; 3]; 3];
        for (dst, src) in rotation.iter_mut().zip(m.rows.iter()) {
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d = S::from_f32(*s);
            }
        }
        Self { rotation, translation }
    }

    /// Compose an object's placement with the camera's world-to-view transform.
    ///
    /// Inputs are converted to `S` first; the matrix product and the
    /// translation are then computed entirely in `S`.
    pub fn compose(camera: &Camera, object_rotation: &Mat3, world_position: Vec3) -> Self {
        let cam = Self::from_mat3(&camera.view_rotation(), ViewVec3::default());
        let obj = Self::from_mat3(object_rotation, ViewVec3::default());

        let mut rotation = [[S::ZERO; 3]; 3];
        for (i, row) in rotation.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = cam.rotation[i][0] * obj.rotation[0][j]
                    + cam.rotation[i][1] * obj.rotation[1][j]
                    + cam.rotation[i][2] * obj.rotation[2][j];
            }
        }

        // Subtract before converting: both positions may be in range while
        // their difference is not representable if formed in `S`
        let rel = ViewVec3::<S>::from_vec3(world_position - camera.position);
        let translation = cam.rotate(rel);

        Self { rotation, translation }
    }

    /// Rotate only (normals)
    #[inline]
    pub fn rotate(&self, v: ViewVec3<S>) -> ViewVec3<S> {
        let r = &self.rotation;
        ViewVec3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        )
    }

    /// Rotate then translate (positions)
    #[inline]
    pub fn apply(&self, v: ViewVec3<S>) -> ViewVec3<S> {
        self.rotate(v) + self.translation
    }
}

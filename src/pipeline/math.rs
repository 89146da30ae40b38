//! Float vector and matrix math
//!
//! These are the caller-facing types: model data, object placement and the
//! camera are all described in f32 and converted to the backend's scalar
//! once per object.

use std::ops::{Add, Mul, Neg, Sub};
use serde::{Deserialize, Serialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn max_abs(self) -> f32 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// 2D Vector (texture coordinates and floor/ceiling offsets)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Row-major 3x3 matrix (rotation + uniform scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3 {
    pub rows: [[f32; 3]; 3],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        rows: [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
    };

    pub const fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Matrix whose rows are the given basis vectors
    pub fn from_basis(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self {
            rows: [[x.x, x.y, x.z], [y.x, y.y, y.z], [z.x, z.y, z.z]],
        }
    }

    /// Build a rotation matrix from euler angles (degrees).
    /// Rotation order: Z * Y * X (matches Blender default).
    pub fn from_euler_degrees(rot: Vec3) -> Self {
        let (sx, cx) = rot.x.to_radians().sin_cos();
        let (sy, cy) = rot.y.to_radians().sin_cos();
        let (sz, cz) = rot.z.to_radians().sin_cos();

        Self {
            rows: [
                [cy * cz, sx * sy * cz - cx * sz, cx * sy * cz + sx * sz],
                [cy * sz, sx * sy * sz + cx * cz, cx * sy * sz - sx * cz],
                [-sy, sx * cy, cx * cy],
            ],
        }
    }

    pub fn row(&self, i: usize) -> Vec3 {
        Vec3::new(self.rows[i][0], self.rows[i][1], self.rows[i][2])
    }

    pub fn scaled(&self, s: f32) -> Mat3 {
        let mut rows = self.rows;
        for row in rows.iter_mut() {
            for v in row.iter_mut() {
                *v *= s;
            }
        }
        Mat3 { rows }
    }

    pub fn mul(&self, other: &Mat3) -> Mat3 {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                for k in 0..3 {
                    *v += self.rows[i][k] * other.rows[k][j];
                }
            }
        }
        Mat3 { rows }
    }

    pub fn transform(&self, v: Vec3) -> Vec3 {
        Vec3::new(self.row(0).dot(v), self.row(1).dot(v), self.row(2).dot(v))
    }

    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }

    /// Upper bound on how much the matrix can lengthen a vector (Frobenius norm)
    pub fn max_stretch(&self) -> f32 {
        self.rows.iter().flatten().map(|v| v * v).sum::<f32>().sqrt()
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_abs_diff_eq!(a.dot(b), 32.0);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert_abs_diff_eq!(c.z, 1.0);
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn test_euler_yaw_90() {
        let m = Mat3::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        let v = m.transform(Vec3::new(0.0, 0.0, 1.0));
        assert_abs_diff_eq!(v.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_max_stretch_bounds_scale() {
        let m = Mat3::from_euler_degrees(Vec3::new(30.0, 45.0, 60.0)).scaled(2.0);
        let v = Vec3::new(1.0, -2.0, 0.5);
        assert!(m.transform(v).len() <= m.max_stretch() * v.len() + 1e-5);
        assert!(m.max_stretch() >= 2.0);
    }

    #[test]
    fn test_mat3_mul_identity() {
        let m = Mat3::from_euler_degrees(Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(m.mul(&Mat3::IDENTITY), m);
        let s = Mat3::IDENTITY.scaled(2.0);
        assert_eq!(s.transform(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(2.0, 4.0, 6.0));
    }
}

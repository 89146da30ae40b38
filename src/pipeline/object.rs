//! Object instances
//!
//! One placement of a model for the current frame. Built fresh every frame
//! from game-object state and never kept.

use serde::{Deserialize, Serialize};

use super::constants::FIXED_ONE;
use super::math::{Mat3, Vec2, Vec3};

/// Caller's identifier for the game object, forwarded untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(pub u64);

/// Opaque portal tag, forwarded to the backend for clip-plane selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortalInfo(pub u32);

/// Rotation + uniform scale, model space to world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectTransform {
    /// Row-major rotation, already multiplied by the scale
    pub matrix: Mat3,
}

impl ObjectTransform {
    pub const IDENTITY: ObjectTransform = ObjectTransform { matrix: Mat3::IDENTITY };

    pub fn new(rotation: Mat3, scale: f32) -> Self {
        Self {
            matrix: rotation.scaled(scale),
        }
    }

    /// Euler angles in degrees (Z * Y * X) plus uniform scale
    pub fn from_euler_degrees(rotation: Vec3, scale: f32) -> Self {
        Self::new(Mat3::from_euler_degrees(rotation), scale)
    }

    /// Legacy 16.16 row-major 3x3 transform
    pub fn from_fixed(m: &[i32; 9]) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (i, v) in m.iter().enumerate() {
            rows[i / 3][i % 3] = *v as f32 / FIXED_ONE as f32;
        }
        Self {
            matrix: Mat3::from_rows(rows),
        }
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Everything the pipeline needs to draw one object this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectInstance {
    pub handle: ObjectHandle,
    pub position: Vec3,
    pub transform: ObjectTransform,
    /// Ambient light level, forwarded unchanged as polygon intensity
    pub ambient: f32,
    /// Texture offset for floor-projected polygons
    pub floor_offset: Vec2,
    /// Texture offset for ceiling-projected polygons
    pub ceil_offset: Vec2,
    pub portal: PortalInfo,
}

impl ObjectInstance {
    pub fn new(handle: ObjectHandle, position: Vec3) -> Self {
        Self {
            handle,
            position,
            transform: ObjectTransform::IDENTITY,
            ambient: 1.0,
            floor_offset: Vec2::ZERO,
            ceil_offset: Vec2::ZERO,
            portal: PortalInfo::default(),
        }
    }

    pub fn with_transform(mut self, transform: ObjectTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_ambient(mut self, ambient: f32) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_offsets(mut self, floor_offset: Vec2, ceil_offset: Vec2) -> Self {
        self.floor_offset = floor_offset;
        self.ceil_offset = ceil_offset;
        self
    }

    pub fn with_portal(mut self, portal: PortalInfo) -> Self {
        self.portal = portal;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fixed_identity() {
        let one = FIXED_ONE;
        let t = ObjectTransform::from_fixed(&[one, 0, 0, 0, one, 0, 0, 0, one]);
        assert_eq!(t, ObjectTransform::IDENTITY);
    }

    #[test]
    fn test_scale_applies_to_matrix() {
        let t = ObjectTransform::new(Mat3::IDENTITY, 3.0);
        assert_eq!(t.matrix.transform(Vec3::new(1.0, 1.0, 1.0)), Vec3::new(3.0, 3.0, 3.0));
    }
}

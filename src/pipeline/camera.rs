//! Camera for view-space transforms
//!
//! The camera's right/down/forward vectors are the rows of the
//! world-to-view rotation. View space puts the eye at the origin looking down +Z, with +Y pointing
//! down the screen.

use serde::{Deserialize, Serialize};
use super::math::{Mat3, Vec3};

/// Eye position and orientation for one frame
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Radians, positive looks up; kept short of straight up/down
    pitch: f32,
    /// Radians about world Y
    yaw: f32,
    /// World-to-view rotation, one basis vector per row
    rotation: Mat3,
}

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

impl Camera {
    /// At the world origin, looking down +Z
    pub fn new() -> Self {
        Self::from_angles(Vec3::ZERO, 0.0, 0.0)
    }

    /// Camera at `position` whose view axes coincide with the world axes.
    /// World coordinates are then view coordinates shifted by `position`.
    pub fn looking_down_z(position: Vec3) -> Self {
        Self {
            position,
            pitch: 0.0,
            yaw: 0.0,
            rotation: Mat3::IDENTITY,
        }
    }

    /// Camera from position and pitch/yaw in radians
    pub fn from_angles(position: Vec3, pitch: f32, yaw: f32) -> Self {
        let mut cam = Self {
            position,
            pitch: 0.0,
            yaw: 0.0,
            rotation: Mat3::IDENTITY,
        };
        cam.set_angles(pitch, yaw);
        cam
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Re-aim the camera and rebuild its basis
    pub fn set_angles(&mut self, pitch: f32, yaw: f32) {
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = yaw;

        let (sin_p, cos_p) = self.pitch.sin_cos();
        let (sin_y, cos_y) = self.yaw.sin_cos();
        let forward = Vec3::new(cos_p * sin_y, -sin_p, cos_p * cos_y);

        // Up is -Y so view Y runs down the screen
        let right = Vec3::new(0.0, -1.0, 0.0).cross(forward).normalize();
        let down = forward.cross(right);
        self.rotation = Mat3::from_basis(right, down, forward);
    }

    /// Turn by relative pitch/yaw deltas
    pub fn turn(&mut self, d_pitch: f32, d_yaw: f32) {
        self.set_angles(self.pitch + d_pitch, self.yaw + d_yaw);
    }

    /// World-to-view rotation
    pub fn view_rotation(&self) -> Mat3 {
        self.rotation
    }

    /// Float world-to-view transform of a single point
    pub fn world_to_view(&self, world_pos: Vec3) -> Vec3 {
        self.rotation.transform(world_pos - self.position)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable camera placement (scene files, config)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraDesc {
    pub position: Vec3,
    /// Pitch in degrees
    #[serde(default)]
    pub pitch: f32,
    /// Yaw in degrees
    #[serde(default)]
    pub yaw: f32,
}

impl From<CameraDesc> for Camera {
    fn from(desc: CameraDesc) -> Self {
        Camera::from_angles(desc.position, desc.pitch.to_radians(), desc.yaw.to_radians())
    }
}

use crate::RotationSink;
use glam::{EulerRot, Quat};

/// A generic rotatable node in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Object3d {
    pub quaternion: Quat,
    /// Order used when viewing the rotation as Euler angles.
    pub rotation_order: EulerRot,
}

impl Default for Object3d {
    fn default() -> Self {
        Self {
            quaternion: Quat::IDENTITY,
            rotation_order: EulerRot::XYZ,
        }
    }
}

impl Object3d {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompose the rotation into Euler angles (radians) in `rotation_order`.
    pub fn euler_angles(&self) -> (f32, f32, f32) {
        self.quaternion.to_euler(self.rotation_order)
    }
}

impl RotationSink for Object3d {
    fn rotation_order(&self) -> EulerRot {
        self.rotation_order
    }

    fn set_rotation_order(&mut self, order: EulerRot) {
        self.rotation_order = order;
    }

    fn set_quaternion(&mut self, quaternion: Quat) {
        self.quaternion = quaternion;
    }
}

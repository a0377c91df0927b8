use crate::RotationSink;
use glam::{EulerRot, Quat, Vec3};

/// Camera for viewing the scene.
///
/// Position is fixed at the origin. Only orientation changes (from the
/// device orientation controls).
pub struct Camera {
    /// Orientation of the handheld device, in scene convention.
    pub orientation: Quat,
    /// Order used when viewing the orientation as Euler angles.
    pub rotation_order: EulerRot,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            orientation: Quat::IDENTITY,
            rotation_order: EulerRot::XYZ,
        }
    }

    /// Direction the camera looks along (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationSink for Camera {
    fn rotation_order(&self) -> EulerRot {
        self.rotation_order
    }

    fn set_rotation_order(&mut self, order: EulerRot) {
        self.rotation_order = order;
    }

    fn set_quaternion(&mut self, quaternion: Quat) {
        self.orientation = quaternion;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_camera_looks_down_negative_z() {
        let camera = Camera::new();
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn forward_follows_written_orientation() {
        let mut camera = Camera::new();
        camera.set_quaternion(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!((camera.forward() - Vec3::NEG_X).length() < 1e-6);
    }
}

//! Mapping from W3C device-orientation angles to a scene-graph rotation.
//!
//! The angles alpha, beta and gamma form intrinsic Tait-Bryan angles of type
//! Z-X'-Y'' in the device's Earth frame. In the scene's Y-up frame that is a
//! Y-X-Z composition with gamma negated.

use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::FRAC_1_SQRT_2;

/// Euler order the sink must use so its Euler view matches the composition below.
pub const DEVICE_ROTATION_ORDER: EulerRot = EulerRot::YXZ;

/// -90 degrees about X: the camera looks out of the back of the device
/// instead of along the Earth's vertical.
pub const DEVICE_TO_CAMERA: Quat = Quat::from_xyzw(-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);

/// Scene rotation for a device orientation. All angles in radians.
///
/// `orient` is the screen rotation relative to the device's natural
/// orientation and is undone about the view axis.
pub fn object_quaternion(alpha: f32, beta: f32, gamma: f32, orient: f32) -> Quat {
    let device = Quat::from_rotation_y(alpha)
        * Quat::from_rotation_x(beta)
        * Quat::from_rotation_z(-gamma);

    device * DEVICE_TO_CAMERA * Quat::from_axis_angle(Vec3::Z, -orient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn flat_device_looks_down() {
        let q = object_quaternion(0.0, 0.0, 0.0, 0.0);
        assert!(q.abs_diff_eq(DEVICE_TO_CAMERA, 1e-7));

        let forward = q * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn upright_device_looks_at_horizon() {
        let q = object_quaternion(0.0, FRAC_PI_2, 0.0, 0.0);
        let forward = q * Vec3::NEG_Z;
        let up = q * Vec3::Y;
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
        assert!((up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn heading_turns_about_vertical() {
        // Upright and turned a quarter to the left.
        let q = object_quaternion(FRAC_PI_2, FRAC_PI_2, 0.0, 0.0);
        let forward = q * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn gamma_rolls_opposite_to_scene_z() {
        let q = object_quaternion(0.0, FRAC_PI_2, 0.3, 0.0);
        let expected = Quat::from_rotation_x(FRAC_PI_2)
            * Quat::from_rotation_z(-0.3)
            * DEVICE_TO_CAMERA;
        assert!(q.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn screen_rotation_is_undone_about_view_axis() {
        let q = object_quaternion(0.0, FRAC_PI_2, 0.0, FRAC_PI_2);
        let forward = q * Vec3::NEG_Z;
        let up = q * Vec3::Y;
        // Same view direction, rolled a quarter turn about it.
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
        assert!((up - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn output_is_unit_length() {
        let q = object_quaternion(1.2, -0.4, 0.9, PI);
        assert!(q.is_normalized());
    }

    #[test]
    fn matches_euler_decomposition_order() {
        let q = object_quaternion(0.4, 0.2, -0.1, 0.0) * DEVICE_TO_CAMERA.conjugate();
        let (y, x, z) = q.to_euler(DEVICE_ROTATION_ORDER);
        assert!((y - 0.4).abs() < 1e-5);
        assert!((x - 0.2).abs() < 1e-5);
        assert!((z - 0.1).abs() < 1e-5);
    }
}

pub mod camera;
pub mod object;

use glam::{EulerRot, Quat};

pub use camera::Camera;
pub use object::Object3d;

/// A scene-graph node whose rotation can be driven externally.
///
/// Writers overwrite the quaternion wholesale. The rotation order only
/// affects how the node's Euler view of that quaternion is decomposed.
pub trait RotationSink {
    /// Current Euler composition order.
    fn rotation_order(&self) -> EulerRot;
    /// Change the Euler composition order. The quaternion is left untouched.
    fn set_rotation_order(&mut self, order: EulerRot);
    /// Replace the node's rotation.
    fn set_quaternion(&mut self, quaternion: Quat);
}

impl<S: RotationSink + ?Sized> RotationSink for &mut S {
    fn rotation_order(&self) -> EulerRot {
        (**self).rotation_order()
    }

    fn set_rotation_order(&mut self, order: EulerRot) {
        (**self).set_rotation_order(order);
    }

    fn set_quaternion(&mut self, quaternion: Quat) {
        (**self).set_quaternion(quaternion);
    }
}

/// 3D transformation matrices and the whole-cube view rotation
use nalgebra::{Matrix4, Vector3};

use crate::cube::Axis;

/// Pitch never reaches straight up/down, so the view never flips over
const MAX_PITCH: f32 = 1.5;

/// Whole-cube view orientation: pitch `x` and yaw `y` (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Tilted so that the U, F and R faces are all visible
    pub fn three_quarter() -> Self {
        Self::new(0.55, -0.65)
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.x = (self.x + dx).clamp(-MAX_PITCH, MAX_PITCH);
        self.y += dy;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::three_quarter()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state: yaw about Y first,
    /// then pitch about X, so pitch always tilts towards the viewer.
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));

        rx * ry
    }

    /// Rotation by `angle` radians about a positive coordinate axis
    pub fn axis_rotation(axis: Axis, angle: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(axis.unit_vector() * angle)
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a uniform scale matrix
    pub fn scale_matrix(s: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(s)
    }
}

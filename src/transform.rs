//! Per-object placement: translation · rotation · scale.

use glam::{EulerRot, Mat4, Vec3, Vec3A};

/// Object transform composed as `translation * rotation * scale`.
///
/// Mutators are incremental for translation and rotation. The composed matrix and
/// its inverse are rebuilt after every mutation, so readers always see
/// `matrix() == T * R * S`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    translation: Vec3,
    euler: Vec3,
    scale: Vec3,
    matrix: Mat4,
    inverse: Mat4,
}

impl Transform {
    /// Identity rotation and unit scale placed at `origin`.
    pub fn new(origin: Vec3A) -> Self {
        let mut transform = Self {
            translation: origin.into(),
            euler: Vec3::ZERO,
            scale: Vec3::ONE,
            matrix: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
        };
        transform.update();
        transform
    }

    /// Add `(dx, dy, dz)` to the current translation.
    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.translation += Vec3::new(dx, dy, dz);
        self.update();
    }

    /// Accumulate Euler angles (radians, XYZ order) and rebuild the rotation.
    pub fn rotate(&mut self, rx: f32, ry: f32, rz: f32) {
        self.euler += Vec3::new(rx, ry, rz);
        self.update();
    }

    /// Replace the per-axis scale.
    ///
    /// Zero components collapse the object and make the inverse degenerate; they
    /// are clamped to a tiny positive value.
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.scale = Vec3::new(x, y, z).map(|s| if s.abs() < 1e-6 { 1e-6 } else { s });
        self.update();
    }

    /// World-space position of the object origin.
    pub fn origin(&self) -> Vec3A {
        self.translation.into()
    }

    /// Current per-axis scale.
    pub fn scale(&self) -> Vec3A {
        self.scale.into()
    }

    /// Accumulated Euler angles in radians.
    pub fn euler(&self) -> Vec3A {
        self.euler.into()
    }

    /// Rotation part alone.
    pub fn rotation(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.euler.x, self.euler.y, self.euler.z)
    }

    /// Model-to-world matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// World-to-model matrix.
    pub fn inverse(&self) -> Mat4 {
        self.inverse
    }

    /// Map a model-space normal to world space (inverse transpose).
    pub fn normal_to_world(&self, normal: Vec3A) -> Vec3A {
        self.inverse.transpose().transform_vector3a(normal).normalize_or_zero()
    }

    fn update(&mut self) {
        let translation = Mat4::from_translation(self.translation);
        let scale = Mat4::from_scale(self.scale);
        self.matrix = translation * self.rotation() * scale;
        self.inverse = self.matrix.inverse();
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3A::ZERO)
    }
}

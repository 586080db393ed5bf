//! Pinhole camera: view rays and screen-space projection.
//!
//! Convention used throughout the crate: left-handed, +Y up, +Z forward,
//! `right = up × forward`. The camera `transform` holds the basis vectors as its
//! first three columns and the position as the fourth, so it maps camera space to
//! world space; `view_matrix()` is its inverse. The projection is a standard
//! `perspective_lh` built from the field-of-view angle, and view rays are generated
//! so that projecting any point on the ray through (x, y) lands back on (x, y).

use glam::{Mat4, Vec2, Vec3A, Vec4};

use crate::ray::Ray;

/// Default near clip distance.
pub const DEFAULT_NEAR: f32 = 0.1;
/// Default far clip distance; hits beyond it are discarded by the canvas.
pub const DEFAULT_FAR: f32 = 100_000.0;

/// Limit applied to the vertical angle in [`Camera::rotate`].
const MAX_VERTICAL: f32 = 3.0;

/// Minimum view-space depth for a point to be projected.
const MIN_PROJECT_DEPTH: f32 = 1e-6;

/// Axis-aligned rectangle in normalized device coordinates, both axes in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Lower-left corner (smallest x and y).
    pub min: Vec2,
    /// Upper-right corner (largest x and y).
    pub max: Vec2,
}

impl ScreenRect {
    /// The whole screen.
    pub const FULL: ScreenRect = ScreenRect {
        min: Vec2::NEG_ONE,
        max: Vec2::ONE,
    };

    const EMPTY: ScreenRect = ScreenRect {
        min: Vec2::INFINITY,
        max: Vec2::NEG_INFINITY,
    };

    fn include(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Clip to the screen; `None` if nothing of the rectangle is visible.
    fn clipped(self) -> Option<ScreenRect> {
        let min = self.min.max(Vec2::NEG_ONE);
        let max = self.max.min(Vec2::ONE);
        (min.x <= max.x && min.y <= max.y).then_some(ScreenRect { min, max })
    }
}

/// Perspective camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians
    fov: f32,
    /// Width over height
    aspect: f32,
    near: f32,
    far: f32,
    /// Camera-to-world: columns are right, up, forward, position
    transform: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Camera at `origin` looking down +Z.
    ///
    /// `fov` is the vertical field of view in radians, `aspect` is width / height.
    pub fn new(fov: f32, aspect: f32, origin: Vec3A) -> Self {
        Self::looking(fov, aspect, origin, Vec3A::Z)
    }

    /// Camera at `origin` looking along `forward`.
    pub fn looking(fov: f32, aspect: f32, origin: Vec3A, forward: Vec3A) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            transform: Mat4::from_translation(origin.into()),
            projection: Mat4::IDENTITY,
        };
        let forward = forward.try_normalize().unwrap_or(Vec3A::Z);
        camera.set_basis(forward, Vec3A::X);
        camera.update_projection();
        camera
    }

    /// Replace the clip distances.
    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near.max(f32::EPSILON);
        self.far = far.max(self.near * 2.0);
        self.update_projection();
        self
    }

    /// Vertical field of view in radians.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Change the field of view; rebuilds the projection.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
        self.update_projection();
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Change the aspect ratio; rebuilds the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection();
    }

    /// Near clip distance.
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Far clip distance.
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Camera-to-world matrix.
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// World-to-camera matrix.
    pub fn view_matrix(&self) -> Mat4 {
        self.transform.inverse()
    }

    /// Perspective projection built from the field-of-view angle.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// `projection * view`, mapping world points to clip space.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// World-space position.
    pub fn position(&self) -> Vec3A {
        self.transform.w_axis.truncate().into()
    }

    /// Unit right axis.
    pub fn right(&self) -> Vec3A {
        self.transform.x_axis.truncate().into()
    }

    /// Unit up axis.
    pub fn up(&self) -> Vec3A {
        self.transform.y_axis.truncate().into()
    }

    /// Unit forward axis.
    pub fn forward(&self) -> Vec3A {
        self.transform.z_axis.truncate().into()
    }

    /// Orient the camera from spherical angles (radians).
    ///
    /// `vertical` is the elevation above the horizon, clamped to `[-3, 3]`;
    /// `horizontal` is the heading around +Y, zero facing +Z. The basis is rebuilt
    /// and re-orthonormalized on every call.
    pub fn rotate(&mut self, vertical: f32, horizontal: f32) {
        let vertical = vertical.clamp(-MAX_VERTICAL, MAX_VERTICAL);
        let forward = Vec3A::new(
            horizontal.sin() * vertical.cos(),
            vertical.sin(),
            horizontal.cos() * vertical.cos(),
        )
        .normalize();
        // Straight up or down: take the heading's right axis
        let fallback_right = Vec3A::new(horizontal.cos(), 0.0, -horizontal.sin());
        self.set_basis(forward, fallback_right);
    }

    /// Move by a world-space offset.
    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.transform.w_axis += Vec4::new(dx, dy, dz, 0.0);
    }

    /// Move along the current forward axis.
    pub fn move_along_forward(&mut self, step: f32) {
        self.transform.w_axis += self.transform.z_axis * step;
    }

    /// Move along the current up axis.
    pub fn move_along_up(&mut self, step: f32) {
        self.transform.w_axis += self.transform.y_axis * step;
    }

    /// Move along the current right axis.
    pub fn move_along_right(&mut self, step: f32) {
        self.transform.w_axis += self.transform.x_axis * step;
    }

    /// World-space ray through normalized device coordinates `x, y ∈ [-1, 1]`.
    ///
    /// The ray starts at the camera position and has a unit direction, so hit
    /// parameters are distances from the eye.
    pub fn view_ray(&self, x: f32, y: f32) -> Ray {
        let tan_half = (self.fov * 0.5).tan();
        let direction = self.right() * (x * tan_half * self.aspect)
            + self.up() * (y * tan_half)
            + self.forward();
        Ray::new(self.position(), direction.normalize())
    }

    /// Project a world point to normalized device coordinates.
    ///
    /// Returns `None` for points on or behind the camera plane. Points outside the
    /// frustum still project (to coordinates outside `[-1, 1]`).
    pub fn project(&self, point: Vec3A) -> Option<Vec2> {
        let view_space = self.view_matrix().transform_point3a(point);
        if view_space.z <= MIN_PROJECT_DEPTH {
            return None;
        }
        let clip = self.projection * view_space.extend(1.0);
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }

    /// Conservative screen rectangle covering the convex hull of `points`.
    ///
    /// Returns `None` when the hull is entirely off-screen or behind the camera,
    /// and the full screen when the hull straddles the camera plane.
    pub fn screen_bounds<I>(&self, points: I) -> Option<ScreenRect>
    where
        I: IntoIterator<Item = Vec3A>,
    {
        let mut rect = ScreenRect::EMPTY;
        let mut projected = 0usize;
        let mut behind = 0usize;

        for point in points {
            match self.project(point) {
                Some(ndc) => {
                    rect.include(ndc);
                    projected += 1;
                }
                None => behind += 1,
            }
        }

        match (projected, behind) {
            (0, _) => None,
            (_, 0) => rect.clipped(),
            _ => Some(ScreenRect::FULL),
        }
    }

    fn set_basis(&mut self, forward: Vec3A, fallback_right: Vec3A) {
        let right = Vec3A::Y.cross(forward);
        let right = if right.length_squared() > 1e-10 {
            right.normalize()
        } else {
            fallback_right.normalize()
        };
        let up = forward.cross(right);

        self.transform.x_axis = right.extend(0.0);
        self.transform.y_axis = up.extend(0.0);
        self.transform.z_axis = forward.extend(0.0);
    }

    fn update_projection(&mut self) {
        self.projection = Mat4::perspective_lh(self.fov, self.aspect, self.near, self.far);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> Camera {
        Camera::new(FRAC_PI_2, 4.0 / 3.0, Vec3A::new(0.0, 0.0, -5.0))
    }

    #[test]
    fn test_rotate_zero_keeps_initial_basis() {
        let mut cam = camera();
        let before = cam.transform();
        cam.rotate(0.0, 0.0);
        assert!(cam.transform().abs_diff_eq(before, 1e-6));
        assert!(cam.right().abs_diff_eq(Vec3A::X, 1e-6));
        assert!(cam.up().abs_diff_eq(Vec3A::Y, 1e-6));
        assert!(cam.forward().abs_diff_eq(Vec3A::Z, 1e-6));
    }

    #[test]
    fn test_rotate_stays_orthonormal() {
        let mut cam = camera();
        for i in 0..50 {
            cam.rotate(i as f32 * 0.37 - 9.0, i as f32 * 0.81);
            let (r, u, f) = (cam.right(), cam.up(), cam.forward());
            assert!((r.length() - 1.0).abs() < 1e-5);
            assert!((u.length() - 1.0).abs() < 1e-5);
            assert!((f.length() - 1.0).abs() < 1e-5);
            assert!(r.dot(u).abs() < 1e-5);
            assert!(r.dot(f).abs() < 1e-5);
            assert!(u.dot(f).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rotate_straight_up_uses_fallback() {
        let mut cam = camera();
        cam.rotate(FRAC_PI_2, 0.0);
        assert!(cam.forward().abs_diff_eq(Vec3A::Y, 1e-5));
        assert!(cam.right().is_finite());
        assert!(cam.right().abs_diff_eq(Vec3A::X, 1e-5));
    }

    #[test]
    fn test_move_along_current_basis() {
        let mut cam = camera();
        cam.rotate(0.0, FRAC_PI_2);
        // Heading a quarter turn: forward is +X
        cam.move_along_forward(2.0);
        assert!(cam.position().abs_diff_eq(Vec3A::new(2.0, 0.0, -5.0), 1e-5));
        cam.move_along_up(1.0);
        assert!(cam.position().abs_diff_eq(Vec3A::new(2.0, 1.0, -5.0), 1e-5));
        cam.move_along_right(1.0);
        assert!(cam.position().abs_diff_eq(Vec3A::new(2.0, 1.0, -6.0), 1e-5));
        cam.translate(0.0, -1.0, 0.0);
        assert!(cam.position().abs_diff_eq(Vec3A::new(2.0, 0.0, -6.0), 1e-5));
    }

    #[test]
    fn test_center_ray_points_forward() {
        let cam = camera();
        let ray = cam.view_ray(0.0, 0.0);
        assert!(ray.origin.abs_diff_eq(Vec3A::new(0.0, 0.0, -5.0), 1e-6));
        assert!(ray.direction.abs_diff_eq(Vec3A::Z, 1e-6));
    }

    #[test]
    fn test_view_ray_projects_back_to_its_pixel() {
        let mut cam = camera();
        cam.rotate(0.3, -0.7);
        for &(x, y) in &[(0.5, 0.5), (-0.9, 0.2), (0.1, -1.0), (1.0, 1.0)] {
            let ray = cam.view_ray(x, y);
            let ndc = cam.project(ray.at(7.5)).unwrap();
            assert!(ndc.abs_diff_eq(Vec2::new(x, y), 1e-4), "({x}, {y}) -> {ndc:?}");
        }
    }

    #[test]
    fn test_fov_is_angle() {
        let mut cam = camera();
        cam.set_fov(1.0);
        assert!((cam.fov() - 1.0).abs() < 1e-6);
        let expected = Mat4::perspective_lh(1.0, cam.aspect(), cam.near(), cam.far());
        assert!(cam.projection().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_screen_bounds_behind_and_straddling() {
        let cam = camera();
        let behind = [Vec3A::new(0.0, 0.0, -10.0), Vec3A::new(1.0, 1.0, -9.0)];
        assert_eq!(cam.screen_bounds(behind), None);

        let straddling = [Vec3A::new(0.0, 0.0, -10.0), Vec3A::new(0.0, 0.0, 10.0)];
        assert_eq!(cam.screen_bounds(straddling), Some(ScreenRect::FULL));

        let off_screen = [Vec3A::new(100.0, 0.0, 0.0), Vec3A::new(101.0, 1.0, 0.0)];
        assert_eq!(cam.screen_bounds(off_screen), None);
    }

    #[test]
    fn test_screen_bounds_in_front() {
        let cam = camera();
        let rect = cam
            .screen_bounds([Vec3A::new(-1.0, -1.0, 0.0), Vec3A::new(1.0, 1.0, 0.0)])
            .unwrap();
        // Depth 5 with tan(45deg) = 1: y spans +-1/5, x spans +-1/(5 * aspect)
        assert!((rect.max.y - 0.2).abs() < 1e-5);
        assert!((rect.min.x + 0.15).abs() < 1e-5);
    }
}

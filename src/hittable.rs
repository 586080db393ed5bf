//! Ray-surface intersection contract.
//!
//! Defines the Hittable trait implemented by every surface variant and the
//! HitRecord it returns. Hits are returned by value, never written into the ray.

use glam::{Vec2, Vec3A};

use crate::camera::{Camera, ScreenRect};
use crate::interval::Interval;
use crate::material::MaterialId;
use crate::ray::Ray;

/// Ray-surface intersection information.
///
/// Contains everything the shading step needs: distance, point, normal,
/// texture coordinates and the material to look up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Point where the ray intersects the surface
    pub point: Vec3A,
    /// Unit surface normal at the hit, facing against the incident ray
    pub normal: Vec3A,
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// True if the ray hits the front face, false if it hits the back face
    pub front_face: bool,
    /// Texture coordinates at the hit
    pub uv: Vec2,
    /// Material of the surface at the hit, if any
    pub material: Option<MaterialId>,
}

impl HitRecord {
    /// Build a record at parameter `t`, orienting `outward_normal` against the ray.
    pub fn new(r: &Ray, t: f32, outward_normal: Vec3A, uv: Vec2, material: Option<MaterialId>) -> Self {
        let mut rec = Self {
            point: r.at(t),
            normal: outward_normal,
            t,
            front_face: true,
            uv,
            material,
        };
        rec.set_face_normal(r, outward_normal);
        rec
    }

    /// Set surface normal and determine front/back face.
    ///
    /// Ensures normal always points against the incident ray.
    pub fn set_face_normal(&mut self, r: &Ray, outward_normal: Vec3A) {
        self.front_face = r.direction.dot(outward_normal) <= 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Capability shared by every surface kind.
///
/// Must be thread-safe (Sync + Send): one surface is queried from every render
/// worker at once.
pub trait Hittable: Sync + Send {
    /// Nearest intersection whose `t` lies strictly inside `ray_t`.
    ///
    /// Misses, hits behind the origin and degenerate configurations all return `None`.
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord>;

    /// Screen rectangle bounding everything of this surface `camera` can see.
    ///
    /// Must over-approximate: every pixel whose view ray hits the surface within
    /// the camera's far distance lies inside the rectangle. `None` means nothing
    /// is visible.
    fn screen_bounds(&self, camera: &Camera) -> Option<ScreenRect>;
}

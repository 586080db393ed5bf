//! Infinite plane primitive.

use glam::{Vec2, Vec3A};

use crate::camera::{Camera, ScreenRect};
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::intersect::intersect_plane;
use crate::material::MaterialId;
use crate::ray::Ray;

/// Plane of all points `x` with `normal · x = distance`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    normal: Vec3A,
    distance: f32,
    /// In-plane texture axes, orthonormal to `normal`.
    tangent: Vec3A,
    bitangent: Vec3A,
    /// Material applied to the whole plane.
    pub material: Option<MaterialId>,
}

impl Plane {
    /// Plane at signed `distance` from the origin along `normal`.
    ///
    /// The normal is normalized; a zero normal falls back to +Y.
    pub fn new(distance: f32, normal: Vec3A) -> Self {
        let normal = normal.try_normalize().unwrap_or(Vec3A::Y);
        let tangent = normal.any_orthonormal_vector();
        let bitangent = normal.cross(tangent);
        Self {
            normal,
            distance,
            tangent,
            bitangent,
            material: None,
        }
    }

    /// Assign a material.
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Unit normal.
    pub fn normal(&self) -> Vec3A {
        self.normal
    }

    /// Signed distance from the world origin.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Point of the plane closest to `point`.
    pub fn closest_point(&self, point: Vec3A) -> Vec3A {
        point - self.normal * (self.normal.dot(point) - self.distance)
    }

    fn uv(&self, point: Vec3A) -> Vec2 {
        Vec2::new(self.tangent.dot(point), self.bitangent.dot(point))
    }
}

impl Hittable for Plane {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let t = intersect_plane(r, self.normal, self.distance)?;
        if !ray_t.surrounds(t) {
            return None;
        }
        let point = r.at(t);
        Some(HitRecord::new(r, t, self.normal, self.uv(point), self.material))
    }

    /// Any visible hit lies within `camera.far()` of the eye, so within that
    /// distance of the eye's foot point on the plane. The square of half-size
    /// `far` around the foot point contains all of them.
    fn screen_bounds(&self, camera: &Camera) -> Option<ScreenRect> {
        let center = self.closest_point(camera.position());
        let extent = camera.far();
        let (a, b) = (self.tangent * extent, self.bitangent * extent);
        camera.screen_bounds([center + a + b, center + a - b, center - a - b, center - a + b])
    }
}

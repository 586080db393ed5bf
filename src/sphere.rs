//! Sphere primitive.
//!
//! The sphere's center is the origin of its transform; only the translation part
//! of the transform is used.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3A};

use crate::camera::{Camera, ScreenRect};
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::intersect::intersect_sphere;
use crate::material::MaterialId;
use crate::ray::Ray;
use crate::transform::Transform;

/// Sphere primitive defined by center, radius, and material.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Radius of the sphere (always non-negative).
    ///
    /// Negative radius values are clamped to 0.0 in the constructor.
    pub radius: f32,

    /// Placement; the translation is the center.
    pub transform: Transform,

    /// Material applied to the whole sphere.
    pub material: Option<MaterialId>,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// Negative radius values are clamped to 0.0.
    pub fn new(radius: f32, center: Vec3A) -> Self {
        Self {
            radius: radius.max(0.0),
            transform: Transform::new(center),
            material: None,
        }
    }

    /// Assign a material.
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Center point of the sphere in world coordinates.
    pub fn center(&self) -> Vec3A {
        self.transform.origin()
    }

    /// Corners of the world-space bounding box.
    fn bounding_corners(&self) -> impl Iterator<Item = Vec3A> {
        let center = self.center();
        let r = self.radius;
        (0..8).map(move |i| {
            let pick = |bit: usize| if i & bit == 0 { -r } else { r };
            center + Vec3A::new(pick(1), pick(2), pick(4))
        })
    }
}

/// Longitude / latitude texture coordinates of a unit direction.
fn spherical_uv(n: Vec3A) -> Vec2 {
    Vec2::new(
        0.5 + n.z.atan2(n.x) / TAU,
        0.5 + n.y.clamp(-1.0, 1.0).asin() / PI,
    )
}

impl Hittable for Sphere {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let center = self.center();
        let (t_min, t_max) = intersect_sphere(r, center, self.radius)?;

        // Entry point if it is ahead of the origin, else the exit point (origin inside)
        let root = if ray_t.surrounds(t_min) {
            t_min
        } else if ray_t.surrounds(t_max) {
            t_max
        } else {
            return None;
        };

        let outward_normal = (r.at(root) - center).normalize_or_zero();
        Some(HitRecord::new(
            r,
            root,
            outward_normal,
            spherical_uv(outward_normal),
            self.material,
        ))
    }

    fn screen_bounds(&self, camera: &Camera) -> Option<ScreenRect> {
        camera.screen_bounds(self.bounding_corners())
    }
}

//! Closed set of renderable surfaces.

use crate::camera::{Camera, ScreenRect};
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::material::MaterialId;
use crate::mesh::Mesh;
use crate::plane::Plane;
use crate::ray::Ray;
use crate::sphere::Sphere;
use crate::transform::Transform;

/// Any surface a scene can hold.
#[derive(Debug, Clone)]
pub enum Surface {
    /// Triangle mesh.
    Mesh(Mesh),
    /// Sphere.
    Sphere(Sphere),
    /// Infinite plane.
    Plane(Plane),
}

impl Surface {
    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Surface::Mesh(_) => "mesh",
            Surface::Sphere(_) => "sphere",
            Surface::Plane(_) => "plane",
        }
    }

    /// Surface-wide material (for meshes, the fallback of faces without one).
    pub fn material(&self) -> Option<MaterialId> {
        match self {
            Surface::Mesh(mesh) => mesh.material,
            Surface::Sphere(sphere) => sphere.material,
            Surface::Plane(plane) => plane.material,
        }
    }

    /// Replace the surface-wide material.
    pub fn set_material(&mut self, material: Option<MaterialId>) {
        match self {
            Surface::Mesh(mesh) => mesh.material = material,
            Surface::Sphere(sphere) => sphere.material = material,
            Surface::Plane(plane) => plane.material = material,
        }
    }

    /// Placement of the surface. Planes are positioned by normal and offset only.
    pub fn transform(&self) -> Option<&Transform> {
        match self {
            Surface::Mesh(mesh) => Some(&mesh.transform),
            Surface::Sphere(sphere) => Some(&sphere.transform),
            Surface::Plane(_) => None,
        }
    }

    /// Mutable placement, see [`Surface::transform`].
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        match self {
            Surface::Mesh(mesh) => Some(&mut mesh.transform),
            Surface::Sphere(sphere) => Some(&mut sphere.transform),
            Surface::Plane(_) => None,
        }
    }
}

impl Hittable for Surface {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match self {
            Surface::Mesh(mesh) => mesh.hit(r, ray_t),
            Surface::Sphere(sphere) => sphere.hit(r, ray_t),
            Surface::Plane(plane) => plane.hit(r, ray_t),
        }
    }

    fn screen_bounds(&self, camera: &Camera) -> Option<ScreenRect> {
        match self {
            Surface::Mesh(mesh) => mesh.screen_bounds(camera),
            Surface::Sphere(sphere) => sphere.screen_bounds(camera),
            Surface::Plane(plane) => plane.screen_bounds(camera),
        }
    }
}

impl From<Mesh> for Surface {
    fn from(mesh: Mesh) -> Self {
        Surface::Mesh(mesh)
    }
}

impl From<Sphere> for Surface {
    fn from(sphere: Sphere) -> Self {
        Surface::Sphere(sphere)
    }
}

impl From<Plane> for Surface {
    fn from(plane: Plane) -> Self {
        Surface::Plane(plane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3A;

    #[test]
    fn test_dispatch_matches_variant() {
        let ray = Ray::new(Vec3A::new(0.0, 5.0, -5.0), Vec3A::Z);
        let sphere = Sphere::new(1.0, Vec3A::new(0.0, 5.0, 0.0));
        let surface = Surface::from(sphere.clone());
        assert_eq!(
            surface.hit(&ray, Interval::default()),
            sphere.hit(&ray, Interval::default())
        );
        assert_eq!(surface.kind(), "sphere");
    }

    #[test]
    fn test_material_and_transform_access() {
        let mut surface = Surface::from(Sphere::new(1.0, Vec3A::ZERO));
        surface.set_material(Some(MaterialId(2)));
        assert_eq!(surface.material(), Some(MaterialId(2)));
        if let Some(transform) = surface.transform_mut() {
            transform.translate(1.0, 0.0, 0.0);
        }
        assert_eq!(surface.transform().map(Transform::origin), Some(Vec3A::X));

        let mut plane = Surface::from(Plane::new(0.0, Vec3A::Y));
        assert!(plane.transform_mut().is_none());
        plane.set_material(Some(MaterialId(1)));
        assert_eq!(plane.material(), Some(MaterialId(1)));
    }
}

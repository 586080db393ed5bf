//! Ray representation for 3D ray casting.
//!
//! A ray is defined as r(t) = origin + t * direction, representing a semi-infinite
//! line in 3D space used for intersection testing. Intersection routines return the
//! hit parameter instead of writing it back into the ray, so one ray value can be
//! tested against any number of surfaces.

use glam::Vec3A;

/// Ray in 3D space defined by origin and direction.
///
/// Mathematical representation: r(t) = origin + t * direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Starting point of the ray in world coordinates.
    ///
    /// For view rays this is the camera position.
    pub origin: Vec3A,

    /// Direction vector of the ray.
    ///
    /// View rays carry unit directions so `t` is a world-space distance. Rays mapped
    /// into a mesh's model space keep the scaled direction, which preserves `t`.
    pub direction: Vec3A,
}

impl Ray {
    /// Create a new ray with origin and direction.
    pub fn new(origin: Vec3A, direction: Vec3A) -> Self {
        Self { origin, direction }
    }

    /// Compute a point at parameter t along the ray.
    ///
    /// Returns r(t) = origin + t * direction.
    pub fn at(&self, t: f32) -> Vec3A {
        self.origin + t * self.direction
    }

    /// Mirror this ray about `normal` at the hit parameter `t`.
    ///
    /// The new ray starts at the hit point; `normal` must be unit length.
    pub fn reflect(&self, t: f32, normal: Vec3A) -> Ray {
        Ray::new(self.at(t), reflect(self.direction, normal))
    }

    /// Bend this ray through an interface at parameter `t` using Snell's law.
    ///
    /// `n1` is the refractive index on the incoming side, `n2` on the far side.
    /// Returns `None` on total internal reflection.
    pub fn refract(&self, t: f32, normal: Vec3A, n1: f32, n2: f32) -> Option<Ray> {
        let unit_direction = self.direction.normalize();
        // Orient the normal against the incoming direction
        let normal = if unit_direction.dot(normal) > 0.0 { -normal } else { normal };
        refract(unit_direction, normal, n1 / n2).map(|direction| Ray::new(self.at(t), direction))
    }
}

/// Reflect a vector off a surface using the law of reflection.
fn reflect(v: Vec3A, n: Vec3A) -> Vec3A {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through an interface; `n` faces the incoming side.
fn refract(uv: Vec3A, n: Vec3A, etai_over_etat: f32) -> Option<Vec3A> {
    let cos_theta = (-uv).dot(n).min(1.0);
    let sin_theta_sq = 1.0 - cos_theta * cos_theta;
    if etai_over_etat * etai_over_etat * sin_theta_sq > 1.0 {
        return None;
    }
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    Some(r_out_perp + r_out_parallel)
}

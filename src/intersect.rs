//! Closed-form ray-primitive intersection routines.
//!
//! Each routine is pure: it returns the hit parameters instead of mutating the ray.
//! Near-zero denominators (ray parallel to a triangle or plane) are misses.

use glam::Vec3A;

use crate::ray::Ray;

/// Determinant / denominator magnitude below which a ray counts as parallel.
pub const PARALLEL_EPSILON: f32 = 1e-8;

/// Result of a ray-triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter of the hit point.
    pub t: f32,
    /// Barycentric weight of the second vertex.
    pub u: f32,
    /// Barycentric weight of the third vertex.
    pub v: f32,
}

impl TriangleHit {
    /// Weight of the first vertex, `1 - u - v`.
    pub fn w(&self) -> f32 {
        1.0 - self.u - self.v
    }

    /// Blend three per-vertex attributes with the barycentric weights.
    pub fn interpolate<T>(&self, a0: T, a1: T, a2: T) -> T
    where
        T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
    {
        a0 * self.w() + a1 * self.u + a2 * self.v
    }
}

/// Intersect a ray with triangle `(p0, p1, p2)` (Möller–Trumbore).
///
/// Both windings are intersectable: a negative determinant flips the sign
/// convention instead of rejecting the triangle. The returned `t` may be negative;
/// callers filter it against their accepted range.
pub fn intersect_triangle(ray: &Ray, p0: Vec3A, p1: Vec3A, p2: Vec3A) -> Option<TriangleHit> {
    let e1 = p1 - p0;
    let e2 = p2 - p0;

    let pvec = ray.direction.cross(e2);
    let mut det = pvec.dot(e1);

    // Ray lies in (or parallel to) the triangle plane
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let tvec = if det > 0.0 {
        ray.origin - p0
    } else {
        det = -det;
        p0 - ray.origin
    };

    let u = tvec.dot(pvec);
    if u < 0.0 || u > det {
        return None;
    }

    let qvec = tvec.cross(e1);
    let v = ray.direction.dot(qvec);
    if v < 0.0 || u + v > det {
        return None;
    }

    let t = e2.dot(qvec) / det;

    Some(TriangleHit {
        t,
        u: u / det,
        v: v / det,
    })
}

/// Intersect a ray with a sphere, returning both roots as `(t_min, t_max)`.
///
/// The roots are `(-b ∓ sqrt(disc)) / a` with `a = |d|²`, so they differ by
/// `2 * sqrt(disc) / a`. Returns `None` when the discriminant is negative.
/// Roots may be negative (sphere behind or around the origin).
pub fn intersect_sphere(ray: &Ray, center: Vec3A, radius: f32) -> Option<(f32, f32)> {
    let rdiff = ray.origin - center;

    let a = ray.direction.length_squared();
    if a < PARALLEL_EPSILON {
        return None;
    }
    let b = rdiff.dot(ray.direction);
    let c = rdiff.length_squared() - radius * radius;

    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();
    let t1 = (-b - sqrtd) / a;
    let t2 = (-b + sqrtd) / a;

    Some((t1.min(t2), t1.max(t2)))
}

/// Intersect a ray with the plane `dot(normal, x) = distance`.
///
/// Returns `None` only when the ray is parallel to the plane; any other `t`
/// (including negative ones) is reported and left for the caller to reject.
pub fn intersect_plane(ray: &Ray, normal: Vec3A, distance: f32) -> Option<f32> {
    let denom = normal.dot(ray.direction);

    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    Some((distance - normal.dot(ray.origin)) / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_sphere_both_roots() {
        let ray = Ray::new(Vec3A::new(0.0, 0.0, -5.0), Vec3A::Z);
        let (t_min, t_max) = intersect_sphere(&ray, Vec3A::ZERO, 1.0).unwrap();
        assert!((t_min - 4.0).abs() < 1e-6);
        assert!((t_max - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_roots_differ_by_chord() {
        let ray = Ray::new(Vec3A::new(0.5, 0.0, -5.0), Vec3A::Z);
        let (t_min, t_max) = intersect_sphere(&ray, Vec3A::ZERO, 1.0).unwrap();
        let half_chord = (1.0_f32 - 0.25).sqrt();
        assert!((t_max - t_min - 2.0 * half_chord).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let ray = Ray::new(Vec3A::new(0.0, 2.0, -5.0), Vec3A::Z);
        assert!(intersect_sphere(&ray, Vec3A::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_sphere_non_unit_direction() {
        let ray = Ray::new(Vec3A::new(0.0, 0.0, -5.0), Vec3A::new(0.0, 0.0, 2.0));
        let (t_min, t_max) = intersect_sphere(&ray, Vec3A::ZERO, 1.0).unwrap();
        assert!((t_min - 2.0).abs() < 1e-6);
        assert!((t_max - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_front_hit() {
        let ray = Ray::new(Vec3A::new(0.2, 0.2, -1.0), Vec3A::Z);
        let hit = intersect_triangle(&ray, Vec3A::ZERO, Vec3A::X, Vec3A::Y).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-6);
        assert!(hit.u >= 0.0 && hit.v >= 0.0);
        assert!(hit.u + hit.v <= 1.0);
        assert!((hit.u - 0.2).abs() < 1e-6);
        assert!((hit.v - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_back_facing_is_hit() {
        let ray = Ray::new(Vec3A::new(0.2, 0.2, -1.0), Vec3A::Z);
        // Reversed winding
        let hit = intersect_triangle(&ray, Vec3A::ZERO, Vec3A::Y, Vec3A::X).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_outside_edges() {
        let ray = Ray::new(Vec3A::new(0.8, 0.8, -1.0), Vec3A::Z);
        assert!(intersect_triangle(&ray, Vec3A::ZERO, Vec3A::X, Vec3A::Y).is_none());
    }

    #[test]
    fn test_triangle_parallel_ray() {
        let ray = Ray::new(Vec3A::new(-1.0, 0.2, 0.0), Vec3A::X);
        assert!(intersect_triangle(&ray, Vec3A::ZERO, Vec3A::X, Vec3A::Y).is_none());
    }

    #[test]
    fn test_triangle_hit_point_matches_barycentric() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let random_point = |rng: &mut ChaCha20Rng| {
            Vec3A::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            )
        };

        let mut hits = 0;
        for _ in 0..2000 {
            let (p0, p1, p2) = (random_point(&mut rng), random_point(&mut rng), random_point(&mut rng));
            if (p1 - p0).cross(p2 - p0).length() < 0.05 {
                continue;
            }
            let origin = random_point(&mut rng) * 4.0;
            let target = random_point(&mut rng) * 0.5;
            let ray = Ray::new(origin, (target - origin).normalize());
            // Grazing rays are ill-conditioned in f32
            let normal = (p1 - p0).cross(p2 - p0).normalize();
            if ray.direction.dot(normal).abs() < 0.1 {
                continue;
            }

            if let Some(hit) = intersect_triangle(&ray, p0, p1, p2) {
                hits += 1;
                let on_ray = ray.at(hit.t);
                let on_triangle = hit.interpolate(p0, p1, p2);
                assert!(
                    on_ray.abs_diff_eq(on_triangle, 1e-3),
                    "ray point {on_ray:?} vs barycentric point {on_triangle:?}"
                );
            }
        }
        assert!(hits > 20, "too few random hits ({hits}) to exercise the law");
    }

    #[test]
    fn test_plane_hit() {
        let ray = Ray::new(Vec3A::new(0.0, 5.0, 0.0), -Vec3A::Y);
        let t = intersect_plane(&ray, Vec3A::Y, 2.0).unwrap();
        assert!((t - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_plane_parallel_is_miss() {
        let ray = Ray::new(Vec3A::new(0.0, 5.0, 0.0), Vec3A::X);
        assert!(intersect_plane(&ray, Vec3A::Y, 2.0).is_none());
    }

    #[test]
    fn test_plane_behind_reports_negative_t() {
        let ray = Ray::new(Vec3A::new(0.0, 5.0, 0.0), Vec3A::Y);
        let t = intersect_plane(&ray, Vec3A::Y, 2.0).unwrap();
        assert!(t < 0.0);
    }
}

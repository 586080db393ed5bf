//! Interval arithmetic for ray parameter ranges.
//!
//! Surfaces only report hits whose `t` lies strictly inside the interval they are
//! given, which is how "behind the camera" and "beyond the far plane" become misses.

/// Smallest accepted hit distance; rejects self-hits at the ray origin.
pub const T_EPSILON: f32 = 1e-4;

/// Interval [min, max] for range checking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Minimum value of the interval
    pub min: f32,
    /// Maximum value of the interval
    pub max: f32,
}

impl Interval {
    /// Create a new interval with given min and max values
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Positive half-line up to `max`, excluding hits at the origin.
    pub fn forward(max: f32) -> Self {
        Self::new(T_EPSILON, max)
    }

    /// Copy of this interval with its upper bound pulled in to `max`.
    pub fn up_to(self, max: f32) -> Self {
        Self::new(self.min, self.max.min(max))
    }

    /// Check if the interval contains the given value (inclusive bounds)
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Check if the interval surrounds the given value (exclusive bounds)
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::forward(f32::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_rejects_origin_and_behind() {
        let ray_t = Interval::forward(10.0);
        assert!(!ray_t.surrounds(0.0));
        assert!(!ray_t.surrounds(-1.0));
        assert!(ray_t.surrounds(5.0));
        assert!(!ray_t.surrounds(10.0));
        assert!(ray_t.contains(10.0));
    }

    #[test]
    fn test_up_to_only_shrinks() {
        let ray_t = Interval::forward(10.0);
        assert_eq!(ray_t.up_to(4.0).max, 4.0);
        assert_eq!(ray_t.up_to(40.0).max, 10.0);
    }
}

use crate::Vec3;

/// A ray in 3D space with an origin and a direction.
///
/// The direction is deliberately left un-normalized: camera rays carry the
/// full vector from the eye to a pixel center, so the parameter `t` passed to
/// [`Ray::at`] is measured in multiples of `direction`, not in world units.
/// Anything that computes a `t` for this ray must use the same convention.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// Unit-length copy of the direction.
    #[inline]
    pub fn unit_direction(&self) -> Vec3 {
        self.direction.normalize()
    }
}

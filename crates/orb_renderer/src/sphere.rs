//! Sphere primitive and the analytic ray-sphere test.

use orb_math::{Ray, Vec3};

/// Returned by [`Sphere::hit`] when the ray has no real intersection.
pub const MISS: f32 = -1.0;

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

/// The one sphere in the scene.
pub const SCENE_SPHERE: Sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5);

impl Sphere {
    /// Create a new sphere.
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Near-root ray parameter where the ray meets the sphere, or [`MISS`].
    ///
    /// The direction is not normalized, so `a` is kept in the quadratic and
    /// the returned `t` is in units of `ray.direction`, matching [`Ray::at`].
    /// Only the near root is reported; it is negative when the origin is
    /// inside or in front of the sphere, and callers must check `t > 0`.
    /// A zero direction divides by zero and yields NaN.
    pub fn hit(&self, ray: &Ray) -> f32 {
        let oc = self.center - ray.origin;
        let a = ray.direction.dot(ray.direction);
        let h = ray.direction.dot(oc);
        let c = oc.dot(oc) - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return MISS;
        }

        (h - discriminant.sqrt()) / a
    }

    /// Outward unit normal at a point on the surface.
    #[inline]
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize()
    }
}

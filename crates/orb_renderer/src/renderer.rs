//! Per-pixel kernel and frame passes.
//!
//! Each pixel runs ray derivation → sphere test → shading with no state
//! shared between pixels, so the frame pass is a plain data-parallel
//! for-each. [`render_into`] walks pixels in order on one thread;
//! [`render_parallel`] splits rows across the rayon pool. Both produce
//! bit-identical buffers.

use crate::{color_to_rgba, Camera, Color, ImageBuffer, Result, Sphere};
use crate::image_buffer::BYTES_PER_TEXEL;
use orb_math::{Ray, Vec3};
use rayon::prelude::*;
use std::time::Instant;

/// Sky color at the bottom of the gradient (`a == 0`).
pub const HORIZON_COLOR: Vec3 = Vec3::new(1.0, 1.0, 1.0);
/// Sky color at the top of the gradient (`a == 1`).
pub const ZENITH_COLOR: Vec3 = Vec3::new(0.5, 0.7, 1.0);

/// Vertical blend factor of the sky: 0 looking straight down, 1 straight up.
#[inline]
pub fn sky_blend(ray: &Ray) -> f32 {
    0.5 * (ray.unit_direction().y + 1.0)
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Vec3 {
    let a = sky_blend(ray);
    (1.0 - a) * HORIZON_COLOR + a * ZENITH_COLOR
}

/// Color for a ray given its sphere test result.
///
/// `t > 0` shades the surface normal mapped from [-1, 1] to [0, 1]; anything
/// else, including [`crate::MISS`] and roots behind the origin, falls through
/// to the sky.
pub fn shade(ray: &Ray, t: f32, sphere: &Sphere) -> Color {
    if t > 0.0 {
        let normal = sphere.normal_at(ray.at(t));
        return ((normal + Vec3::ONE) * 0.5).extend(1.0);
    }

    sky_gradient(ray).extend(1.0)
}

/// Run the kernel for a single pixel.
#[inline]
pub fn render_pixel(camera: &Camera, sphere: &Sphere, x: u32, y: u32) -> Color {
    let ray = camera.get_ray(x, y);
    let t = sphere.hit(&ray);
    shade(&ray, t, sphere)
}

fn render_row(camera: &Camera, sphere: &Sphere, y: u32, row: &mut [u8]) {
    for (x, texel) in row.chunks_exact_mut(BYTES_PER_TEXEL).enumerate() {
        let color = render_pixel(camera, sphere, x as u32, y);
        texel.copy_from_slice(&color_to_rgba(color));
    }
}

/// Render the entire frame into `image` on the calling thread.
pub fn render_into(camera: &Camera, sphere: &Sphere, image: &mut ImageBuffer) {
    for y in 0..image.height() {
        for x in 0..image.width() {
            image.set(x, y, color_to_rgba(render_pixel(camera, sphere, x, y)));
        }
    }
}

/// Render the entire frame into `image`, one rayon task per row.
///
/// Returns only once every row is written, so callers always see a complete
/// frame.
pub fn render_parallel(camera: &Camera, sphere: &Sphere, image: &mut ImageBuffer) {
    let start = Instant::now();
    let (width, height) = (image.width(), image.height());
    let row_bytes = image.bytes_per_row() as usize;

    image
        .as_bytes_mut()
        .par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| render_row(camera, sphere, y as u32, row));

    log::debug!("Frame pass {}x{} in {:?}", width, height, start.elapsed());
}

/// Render a fresh frame of the given size.
pub fn render(camera: &Camera, sphere: &Sphere, width: u32, height: u32) -> Result<ImageBuffer> {
    let mut image = ImageBuffer::new(width, height)?;
    render_parallel(camera, sphere, &mut image);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraSettings, MISS, SCENE_SPHERE};

    /// 4x4 camera whose viewport spans [-1, 1] x [-1, 1] at z = -1.
    fn unit_viewport_camera() -> Camera {
        Camera::new(
            Vec3::ZERO,
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(-0.75, 0.75, -1.0),
        )
    }

    #[test]
    fn test_sky_gradient_endpoints() {
        let down = Ray::new(Vec3::ZERO, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(sky_blend(&down), 0.0);
        assert_eq!(sky_gradient(&down), HORIZON_COLOR);

        let up = Ray::new(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(sky_blend(&up), 1.0);
        assert_eq!(sky_gradient(&up), ZENITH_COLOR);
    }

    #[test]
    fn test_sky_gradient_horizontal_is_midpoint() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let color = sky_gradient(&ray);
        assert!((color - Vec3::new(0.75, 0.85, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_shade_hit_uses_normal() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let t = SCENE_SPHERE.hit(&ray);

        assert_eq!(shade(&ray, t, &SCENE_SPHERE), Color::new(0.5, 0.5, 1.0, 1.0));
    }

    #[test]
    fn test_shade_miss_falls_back_to_sky() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = SCENE_SPHERE.hit(&ray);

        assert_eq!(t, MISS);
        assert_eq!(shade(&ray, t, &SCENE_SPHERE), sky_gradient(&ray).extend(1.0));
    }

    #[test]
    fn test_shade_negative_root_is_sky() {
        let ray = Ray::new(SCENE_SPHERE.center, Vec3::new(0.0, 1.0, 0.0));
        let t = SCENE_SPHERE.hit(&ray);

        assert!(t < 0.0);
        assert_eq!(shade(&ray, t, &SCENE_SPHERE), ZENITH_COLOR.extend(1.0));
    }

    #[test]
    fn test_shade_zero_t_is_sky() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
        assert_eq!(shade(&ray, 0.0, &SCENE_SPHERE), HORIZON_COLOR.extend(1.0));
    }

    #[test]
    fn test_render_4x4_scene() {
        let camera = unit_viewport_camera();
        let image = render(&camera, &SCENE_SPHERE, 4, 4).unwrap();

        let horizon = color_to_rgba(HORIZON_COLOR.extend(1.0));
        let zenith = color_to_rgba(ZENITH_COLOR.extend(1.0));

        // Center four pixels hit the sphere
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            let ray = camera.get_ray(x, y);
            let t = SCENE_SPHERE.hit(&ray);
            assert!(t > 0.0, "pixel ({x}, {y}) should hit, t={t}");
            assert_eq!(image.get(x, y), color_to_rgba(shade(&ray, t, &SCENE_SPHERE)));
        }

        // Corner pixels see sky strictly inside the gradient
        for (x, y) in [(0, 0), (3, 0), (0, 3), (3, 3)] {
            let ray = camera.get_ray(x, y);
            assert!(SCENE_SPHERE.hit(&ray) <= 0.0, "pixel ({x}, {y}) should miss");

            let a = sky_blend(&ray);
            assert!(a > 0.0 && a < 1.0, "pixel ({x}, {y}) blend {a}");

            let texel = image.get(x, y);
            assert_eq!(texel[3], 255);
            assert_ne!(texel, horizon);
            assert_ne!(texel, zenith);
        }

        // Upper corners lean towards the zenith, lower corners towards the horizon
        assert!(sky_blend(&camera.get_ray(0, 0)) > 0.5);
        assert!(sky_blend(&camera.get_ray(0, 3)) < 0.5);
    }

    #[test]
    fn test_center_pixel_normals_point_at_camera() {
        let camera = unit_viewport_camera();

        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            let color = render_pixel(&camera, &SCENE_SPHERE, x, y);
            // Normal z in (0, 1] maps to blue above 0.5
            assert!(color.z > 0.5);
            assert_eq!(color.w, 1.0);
        }

        // Left half normals lean -x, right half +x
        assert!(render_pixel(&camera, &SCENE_SPHERE, 1, 1).x < 0.5);
        assert!(render_pixel(&camera, &SCENE_SPHERE, 2, 1).x > 0.5);
    }

    #[test]
    fn test_render_is_deterministic() {
        let camera = CameraSettings::new()
            .with_resolution(64, 48)
            .to_camera()
            .unwrap();

        let a = render(&camera, &SCENE_SPHERE, 64, 48).unwrap();
        let b = render(&camera, &SCENE_SPHERE, 64, 48).unwrap();
        assert_eq!(a, b);

        let mut sequential = ImageBuffer::new(64, 48).unwrap();
        render_into(&camera, &SCENE_SPHERE, &mut sequential);
        assert_eq!(a, sequential);
    }

    #[test]
    fn test_render_writes_every_pixel_opaque() {
        let camera = CameraSettings::new()
            .with_resolution(17, 9)
            .to_camera()
            .unwrap();
        let image = render(&camera, &SCENE_SPHERE, 17, 9).unwrap();

        assert!(image.as_bytes().chunks_exact(4).all(|texel| texel[3] == 255));
    }

    #[test]
    fn test_render_rejects_empty_frame() {
        let camera = unit_viewport_camera();
        assert!(render(&camera, &SCENE_SPHERE, 0, 4).is_err());
    }
}

//! Camera for ray generation.
//!
//! [`CameraSettings`] is the user-facing description (position, lens,
//! resolution). [`CameraSettings::to_camera`] reduces it to the four vectors
//! the kernel actually consumes, stored in [`Camera`].

use crate::{RenderError, Result};
use orb_math::{Ray, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-frame camera record consumed by the kernel.
///
/// `viewport_du`/`viewport_dv` are world-space steps of one pixel along the
/// image's x and y axes; `dv` points down the image so that `y = 0` is the
/// top row. These are trusted to be consistent with the field of view and
/// aspect ratio; the kernel does not check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub origin: Vec3,
    pub viewport_du: Vec3,
    pub viewport_dv: Vec3,
    pub pixel00_center: Vec3,
}

impl Camera {
    /// Create a camera record from precomputed viewport vectors.
    pub fn new(origin: Vec3, viewport_du: Vec3, viewport_dv: Vec3, pixel00_center: Vec3) -> Self {
        Self {
            origin,
            viewport_du,
            viewport_dv,
            pixel00_center,
        }
    }

    /// World position of the center of pixel (x, y).
    #[inline]
    pub fn pixel_center(&self, x: u32, y: u32) -> Vec3 {
        self.pixel00_center + (x as f32) * self.viewport_du + (y as f32) * self.viewport_dv
    }

    /// Generate the primary ray for pixel (x, y).
    ///
    /// The direction is `pixel_center - origin` and is not normalized.
    #[inline]
    pub fn get_ray(&self, x: u32, y: u32) -> Ray {
        Ray::new(self.origin, self.pixel_center(x, y) - self.origin)
    }
}

/// Camera placement, lens and output resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub image_width: u32,
    pub image_height: u32,

    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    pub vup: [f32; 3],

    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Distance from the eye to the viewport plane
    pub focus_dist: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            image_width: 800,
            image_height: 450,
            look_from: [0.0, 0.0, 0.0],
            look_at: [0.0, 0.0, -1.0],
            vup: [0.0, 1.0, 0.0],
            vfov: 90.0,
            focus_dist: 1.0,
        }
    }
}

impl CameraSettings {
    /// Create settings with default placement and lens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from.to_array();
        self.look_at = look_at.to_array();
        self.vup = vup.to_array();
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.focus_dist = focus_dist;
        self
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded camera settings from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.image_width as f32 / self.image_height as f32
    }

    /// Check that the settings describe a usable pinhole camera.
    pub fn validate(&self) -> Result<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(RenderError::EmptyImage {
                width: self.image_width,
                height: self.image_height,
            });
        }
        if !self.vfov.is_finite() || self.vfov <= 0.0 || self.vfov >= 180.0 {
            return Err(RenderError::InvalidSettings(format!(
                "vfov must be in (0, 180) degrees, got {}",
                self.vfov
            )));
        }
        if !self.focus_dist.is_finite() || self.focus_dist <= 0.0 {
            return Err(RenderError::InvalidSettings(format!(
                "focus_dist must be positive, got {}",
                self.focus_dist
            )));
        }

        let forward = Vec3::from_array(self.look_from) - Vec3::from_array(self.look_at);
        if forward.length_squared() <= f32::EPSILON {
            return Err(RenderError::InvalidSettings(
                "look_from and look_at coincide".to_string(),
            ));
        }
        if Vec3::from_array(self.vup).cross(forward).length_squared() <= f32::EPSILON {
            return Err(RenderError::InvalidSettings(
                "vup is parallel to the view direction".to_string(),
            ));
        }

        Ok(())
    }

    /// Derive the kernel's camera record.
    pub fn to_camera(&self) -> Result<Camera> {
        self.validate()?;

        let center = Vec3::from_array(self.look_from);

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * self.aspect_ratio();

        // Calculate camera basis vectors
        let w = (center - Vec3::from_array(self.look_at)).normalize();
        let u = Vec3::from_array(self.vup).cross(w).normalize();
        let v = w.cross(u);

        // Viewport edges; v is flipped so rows go downwards
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let viewport_du = viewport_u / self.image_width as f32;
        let viewport_dv = viewport_v / self.image_height as f32;

        let viewport_upper_left =
            center - self.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_center = viewport_upper_left + 0.5 * (viewport_du + viewport_dv);

        log::debug!(
            "Camera {}x{}: du={:?} dv={:?} pixel00={:?}",
            self.image_width,
            self.image_height,
            viewport_du,
            viewport_dv,
            pixel00_center
        );

        Ok(Camera::new(center, viewport_du, viewport_dv, pixel00_center))
    }
}

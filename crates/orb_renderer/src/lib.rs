//! Orb renderer - single-sphere ray-trace kernel.
//!
//! One primary ray per pixel from a pinhole camera, an analytic test against
//! the scene's one sphere, and a two-branch shading policy (surface normal on
//! hit, sky gradient on miss). The same math runs on the GPU in
//! `orb_viewport`'s compute shader; this crate is the CPU rendition.

mod camera;
mod error;
mod image_buffer;
mod renderer;
mod sphere;

pub use camera::{Camera, CameraSettings};
pub use error::{RenderError, Result};
pub use image_buffer::{color_to_rgba, ImageBuffer, BYTES_PER_TEXEL};
pub use renderer::{
    render, render_into, render_parallel, render_pixel, shade, sky_blend, sky_gradient,
    HORIZON_COLOR, ZENITH_COLOR,
};
pub use sphere::{Sphere, MISS, SCENE_SPHERE};

/// RGBA color with channels in [0, 1].
pub type Color = orb_math::Vec4;

/// Re-export the math types the kernel is written in
pub use orb_math::{Ray, Vec3, Vec4};

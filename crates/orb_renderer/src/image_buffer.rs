//! RGBA8 pixel buffer written by the frame pass.

use crate::{Color, RenderError, Result};
use std::path::Path;

/// Bytes per texel (RGBA, 8 bits per channel).
pub const BYTES_PER_TEXEL: usize = 4;

/// Convert one channel to unorm8 the way `rgba8unorm` storage does.
#[inline]
fn to_unorm8(x: f32) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Convert a color to 8-bit RGBA. No gamma is applied.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    [
        to_unorm8(color.x),
        to_unorm8(color.y),
        to_unorm8(color.z),
        to_unorm8(color.w),
    ]
}

/// Tightly packed RGBA8 image, row-major with the origin at the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    texels: Vec<u8>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with transparent black.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }
        Ok(Self {
            width,
            height,
            texels: vec![0; width as usize * height as usize * BYTES_PER_TEXEL],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes, as passed to texture uploads.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * BYTES_PER_TEXEL as u32
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_TEXEL
    }

    /// Get the texel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.texels[i],
            self.texels[i + 1],
            self.texels[i + 2],
            self.texels[i + 3],
        ]
    }

    /// Set the texel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.texels[i..i + BYTES_PER_TEXEL].copy_from_slice(&rgba);
    }

    /// Raw RGBA bytes (for upload or saving).
    pub fn as_bytes(&self) -> &[u8] {
        &self.texels
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.texels
    }

    /// Write the image as an 8-bit RGBA PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        image::save_buffer_with_format(
            path.as_ref(),
            &self.texels,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        log::info!(
            "Saved {}x{} image to {}",
            self.width,
            self.height,
            path.as_ref().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(color_to_rgba(Color::new(0.0, 0.5, 1.0, 1.0)), [0, 128, 255, 255]);
        // Out of range values clamp
        assert_eq!(color_to_rgba(Color::new(-1.0, 2.0, 0.0, 1.0)), [0, 255, 0, 255]);
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(matches!(
            ImageBuffer::new(0, 4),
            Err(RenderError::EmptyImage { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_get_set_row_major() {
        let mut image = ImageBuffer::new(3, 2).unwrap();
        image.set(2, 1, [1, 2, 3, 4]);

        assert_eq!(image.get(2, 1), [1, 2, 3, 4]);
        assert_eq!(image.get(0, 0), [0, 0, 0, 0]);
        // Last texel of the last row
        assert_eq!(&image.as_bytes()[20..24], &[1, 2, 3, 4]);
        assert_eq!(image.bytes_per_row(), 12);
    }

    #[test]
    fn test_save_png_round_trip() {
        let mut image = ImageBuffer::new(2, 1).unwrap();
        image.set(0, 0, [255, 0, 0, 255]);
        image.set(1, 0, [0, 0, 255, 255]);

        let path = std::env::temp_dir().join(format!("orb_save_png_{}.png", std::process::id()));
        image.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().into_rgba8();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.dimensions(), (2, 1));
        assert_eq!(loaded.as_raw().as_slice(), image.as_bytes());
    }
}

//! The kernel's output image on the GPU.
//!
//! One texture serves both passes: the compute kernel writes it as a storage
//! image (or the CPU frame is uploaded into it) and the presentation pass
//! samples it.

use anyhow::{ensure, Result};
use orb_renderer::ImageBuffer;
use wgpu::{Device, Extent3d, Queue, Texture, TextureView};

/// Texel format shared by the storage binding and the CPU image buffer.
pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub struct OutputTexture {
    pub texture: Texture,
    pub view: TextureView,
}

impl OutputTexture {
    pub fn new(device: &Device, size: (u32, u32)) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Kernel Output"),
            size: Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Kernel Output View"),
            ..Default::default()
        });

        Self { texture, view }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    /// Copy a finished CPU frame into the texture.
    pub fn upload(&self, queue: &Queue, image: &ImageBuffer) -> Result<()> {
        ensure!(
            self.size() == (image.width(), image.height()),
            "frame is {}x{} but output texture is {}x{}",
            image.width(),
            image.height(),
            self.texture.width(),
            self.texture.height()
        );

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_bytes(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(image.bytes_per_row()),
                rows_per_image: Some(image.height()),
            },
            self.texture.size(),
        );

        Ok(())
    }
}

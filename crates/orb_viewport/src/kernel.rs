//! GPU rendition of the ray-trace kernel.
//!
//! Runs `raytrace.wgsl` as a compute pass, one invocation per texel of the
//! output texture.

use crate::bindings::KERNEL_BINDINGS;
use crate::target::OutputTexture;
use crate::uniform::CameraUniform;
use anyhow::Result;
use orb_renderer::Camera;
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, CommandEncoder, ComputePipeline, Device, Queue};

/// Must match `@workgroup_size` in `raytrace.wgsl`.
pub const WORKGROUP_SIZE: (u32, u32) = (8, 8);

/// Workgroups needed to cover a `width` x `height` image.
///
/// Rounds up; the shader discards invocations past the image edge, so every
/// texel is written by exactly one invocation.
pub fn workgroup_count(width: u32, height: u32) -> (u32, u32) {
    (
        width.div_ceil(WORKGROUP_SIZE.0),
        height.div_ceil(WORKGROUP_SIZE.1),
    )
}

pub struct GpuKernel {
    pipeline: ComputePipeline,
    bind_group_layout: BindGroupLayout,
    bind_group: BindGroup,
    camera_buffer: Buffer,
}

impl GpuKernel {
    pub fn new(device: &Device, camera: &Camera, output: &OutputTexture) -> Result<Self> {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::from(camera)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = KERNEL_BINDINGS.create_layout(device);
        let bind_group = Self::create_bind_group(device, &bind_group_layout, &camera_buffer, output)?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Ray Trace Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/raytrace.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Kernel Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Kernel Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_group,
            camera_buffer,
        })
    }

    fn create_bind_group(
        device: &Device,
        layout: &BindGroupLayout,
        camera_buffer: &Buffer,
        output: &OutputTexture,
    ) -> Result<BindGroup> {
        KERNEL_BINDINGS.create_bind_group(
            device,
            layout,
            vec![
                ("camera", camera_buffer.as_entire_binding()),
                ("output_image", wgpu::BindingResource::TextureView(&output.view)),
            ],
        )
    }

    /// Point the kernel at a new output texture (after a resize).
    pub fn rebind(&mut self, device: &Device, output: &OutputTexture) -> Result<()> {
        self.bind_group =
            Self::create_bind_group(device, &self.bind_group_layout, &self.camera_buffer, output)?;
        Ok(())
    }

    pub fn update_camera(&self, queue: &Queue, camera: &Camera) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::from(camera)]),
        );
    }

    /// Record the full frame pass.
    pub fn dispatch(&self, encoder: &mut CommandEncoder, size: (u32, u32)) {
        let (groups_x, groups_y) = workgroup_count(size.0, size.1);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Kernel Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.dispatch_workgroups(groups_x, groups_y, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroup_count_exact_fit() {
        assert_eq!(workgroup_count(64, 16), (8, 2));
    }

    #[test]
    fn test_workgroup_count_partial_fit() {
        // 4x4 needs one group; 100x9 needs 13x2
        assert_eq!(workgroup_count(4, 4), (1, 1));
        assert_eq!(workgroup_count(100, 9), (13, 2));

        let (gx, gy) = workgroup_count(1281, 721);
        assert!(gx * WORKGROUP_SIZE.0 >= 1281 && (gx - 1) * WORKGROUP_SIZE.0 < 1281);
        assert!(gy * WORKGROUP_SIZE.1 >= 721 && (gy - 1) * WORKGROUP_SIZE.1 < 721);
    }

    #[test]
    fn test_scene_constants_match_shader() {
        use orb_renderer::{HORIZON_COLOR, SCENE_SPHERE, ZENITH_COLOR};

        let source = include_str!("shaders/raytrace.wgsl");
        let vec3 = |v: orb_renderer::Vec3| format!("vec3<f32>({:?}, {:?}, {:?})", v.x, v.y, v.z);

        assert!(source.contains(&format!("const SPHERE_CENTER = {};", vec3(SCENE_SPHERE.center))));
        assert!(source.contains(&format!("const SPHERE_RADIUS: f32 = {:?};", SCENE_SPHERE.radius)));
        assert!(source.contains(&format!("const HORIZON_COLOR = {};", vec3(HORIZON_COLOR))));
        assert!(source.contains(&format!("const ZENITH_COLOR = {};", vec3(ZENITH_COLOR))));
        assert!(source.contains(&format!("const MISS: f32 = {:?};", orb_renderer::MISS)));
    }

    #[test]
    fn test_kernel_shader_validates() {
        let module = crate::validated_module(include_str!("shaders/raytrace.wgsl"));

        let entry = module
            .entry_points
            .iter()
            .find(|entry| entry.name == "main")
            .expect("kernel entry point");
        assert_eq!(entry.stage, naga::ShaderStage::Compute);
        assert_eq!(entry.workgroup_size, [WORKGROUP_SIZE.0, WORKGROUP_SIZE.1, 1]);

        for name in ["ray_at", "hit_sphere", "shade"] {
            assert!(
                module.functions.iter().any(|(_, f)| f.name.as_deref() == Some(name)),
                "missing {}",
                name
            );
        }
    }

    #[test]
    fn test_workgroup_size_matches_shader() {
        let source = include_str!("shaders/raytrace.wgsl");
        let attribute = format!(
            "@workgroup_size({}, {}, 1)",
            WORKGROUP_SIZE.0, WORKGROUP_SIZE.1
        );
        assert!(source.contains(&attribute));
    }
}

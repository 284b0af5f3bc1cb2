//! Presentation pass: draw the output image on a full-screen quad.

use crate::bindings::PRESENT_BINDINGS;
use crate::target::OutputTexture;
use anyhow::Result;
use wgpu::{
    BindGroup, BindGroupLayout, CommandEncoder, Device, FilterMode, RenderPipeline, Sampler,
    TextureFormat, TextureView,
};

pub struct PresentPass {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    bind_group: BindGroup,
    sampler: Sampler,
}

impl PresentPass {
    pub fn new(
        device: &Device,
        surface_format: TextureFormat,
        filter: FilterMode,
        output: &OutputTexture,
    ) -> Result<Self> {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Present Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            ..Default::default()
        });

        let bind_group_layout = PRESENT_BINDINGS.create_layout(device);
        let bind_group = Self::create_bind_group(device, &bind_group_layout, &sampler, output)?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Present Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/present.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Present Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Present Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_group,
            sampler,
        })
    }

    fn create_bind_group(
        device: &Device,
        layout: &BindGroupLayout,
        sampler: &Sampler,
        output: &OutputTexture,
    ) -> Result<BindGroup> {
        PRESENT_BINDINGS.create_bind_group(
            device,
            layout,
            vec![
                ("source_image", wgpu::BindingResource::TextureView(&output.view)),
                ("source_sampler", wgpu::BindingResource::Sampler(sampler)),
            ],
        )
    }

    /// Sample a new output texture (after a resize).
    pub fn rebind(&mut self, device: &Device, output: &OutputTexture) -> Result<()> {
        self.bind_group =
            Self::create_bind_group(device, &self.bind_group_layout, &self.sampler, output)?;
        Ok(())
    }

    /// Record the quad draw into `target`.
    pub fn draw(&self, encoder: &mut CommandEncoder, target: &TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Present Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_present_shader_validates() {
        let module = crate::validated_module(include_str!("shaders/present.wgsl"));

        let stages: Vec<_> = module
            .entry_points
            .iter()
            .map(|entry| (entry.name.as_str(), entry.stage))
            .collect();
        assert!(stages.contains(&("vs_main", naga::ShaderStage::Vertex)));
        assert!(stages.contains(&("fs_main", naga::ShaderStage::Fragment)));
    }
}

//! Named resource binding tables.
//!
//! Each pipeline's bind group is described once as a table of symbolic names
//! (`camera`, `output_image`, ...) mapped to a binding slot and resource kind.
//! Layouts and bind groups are built from the table, and resources are looked
//! up by name, so the Rust side never hard-codes slot numbers.

use anyhow::{anyhow, bail, Result};
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutEntry, BindingResource, BindingType, Device,
    ShaderStages,
};

/// What sits behind a binding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Uniform buffer
    Uniform,
    /// Write-only `rgba8unorm` storage texture
    StorageImage,
    /// Filterable 2D float texture
    SampledImage,
    /// Filtering sampler
    Sampler,
}

impl ResourceKind {
    fn binding_type(self) -> BindingType {
        match self {
            ResourceKind::Uniform => BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            ResourceKind::StorageImage => BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: crate::target::OUTPUT_FORMAT,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            ResourceKind::SampledImage => BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            ResourceKind::Sampler => BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        }
    }
}

/// One named slot in a bind group.
#[derive(Debug, Clone, Copy)]
pub struct BindingSlot {
    pub name: &'static str,
    pub binding: u32,
    pub kind: ResourceKind,
    pub visibility: ShaderStages,
}

/// All slots of one bind group.
#[derive(Debug, Clone, Copy)]
pub struct BindingTable {
    pub label: &'static str,
    pub slots: &'static [BindingSlot],
}

/// Group 0 of `raytrace.wgsl`.
pub const KERNEL_BINDINGS: BindingTable = BindingTable {
    label: "Kernel",
    slots: &[
        BindingSlot {
            name: "camera",
            binding: 0,
            kind: ResourceKind::Uniform,
            visibility: ShaderStages::COMPUTE,
        },
        BindingSlot {
            name: "output_image",
            binding: 1,
            kind: ResourceKind::StorageImage,
            visibility: ShaderStages::COMPUTE,
        },
    ],
};

/// Group 0 of `present.wgsl`.
pub const PRESENT_BINDINGS: BindingTable = BindingTable {
    label: "Present",
    slots: &[
        BindingSlot {
            name: "source_image",
            binding: 0,
            kind: ResourceKind::SampledImage,
            visibility: ShaderStages::FRAGMENT,
        },
        BindingSlot {
            name: "source_sampler",
            binding: 1,
            kind: ResourceKind::Sampler,
            visibility: ShaderStages::FRAGMENT,
        },
    ],
};

impl BindingTable {
    /// Look up a slot by name.
    pub fn slot(&self, name: &str) -> Option<&BindingSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// Binding index for a name.
    pub fn binding(&self, name: &str) -> Result<u32> {
        self.slot(name)
            .map(|slot| slot.binding)
            .ok_or_else(|| anyhow!("{} bindings have no slot named '{}'", self.label, name))
    }

    pub fn layout_entries(&self) -> Vec<BindGroupLayoutEntry> {
        self.slots
            .iter()
            .map(|slot| BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: slot.visibility,
                ty: slot.kind.binding_type(),
                count: None,
            })
            .collect()
    }

    pub fn create_layout(&self, device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} Bind Group Layout", self.label)),
            entries: &self.layout_entries(),
        })
    }

    /// Build a bind group from `(name, resource)` pairs.
    ///
    /// Every slot must be supplied exactly once and every name must exist.
    pub fn create_bind_group<'a>(
        &self,
        device: &Device,
        layout: &BindGroupLayout,
        resources: Vec<(&str, BindingResource<'a>)>,
    ) -> Result<BindGroup> {
        if resources.len() != self.slots.len() {
            bail!(
                "{} bindings expect {} resources, got {}",
                self.label,
                self.slots.len(),
                resources.len()
            );
        }

        let mut entries = Vec::with_capacity(resources.len());
        for (name, resource) in resources {
            let binding = self.binding(name)?;
            if entries.iter().any(|e: &wgpu::BindGroupEntry| e.binding == binding) {
                bail!("{} binding '{}' supplied twice", self.label, name);
            }
            entries.push(wgpu::BindGroupEntry { binding, resource });
        }

        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", self.label)),
            layout,
            entries: &entries,
        }))
    }
}

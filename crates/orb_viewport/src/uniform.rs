//! Camera uniform data for GPU.

use orb_renderer::Camera;

/// The kernel's four camera vectors, each padded to 16 bytes to match the
/// WGSL `vec3<f32>` uniform layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub camera_origin: [f32; 3],
    _pad0: f32,
    pub viewport_du: [f32; 3],
    _pad1: f32,
    pub viewport_dv: [f32; 3],
    _pad2: f32,
    pub pixel00_center: [f32; 3],
    _pad3: f32,
}

impl From<&Camera> for CameraUniform {
    fn from(camera: &Camera) -> Self {
        Self {
            camera_origin: camera.origin.to_array(),
            _pad0: 0.0,
            viewport_du: camera.viewport_du.to_array(),
            _pad1: 0.0,
            viewport_dv: camera.viewport_dv.to_array(),
            _pad2: 0.0,
            pixel00_center: camera.pixel00_center.to_array(),
            _pad3: 0.0,
        }
    }
}

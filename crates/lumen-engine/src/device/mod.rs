//! Rendering context abstraction.
//!
//! The orchestrator owns one [`RenderDevice`] and hands it by `&mut` to each
//! stage (program build, geometry, texture, uniforms, draw). No stage reaches
//! for ambient global state; everything it touches comes through the device.
//!
//! [`Gpu`] is the wgpu implementation. Tests substitute a recording mock.

mod gpu;
mod init;

#[cfg(test)]
pub(crate) mod mock;

pub use gpu::{Gpu, GpuBindings, GpuProgram, GpuShader, GpuTarget, GpuTexture};
pub use init::DeviceInit;

use crate::error::{Result, ShaderStage};
use crate::image::Image;
use crate::render::FilterUniforms;

/// GPU operations the color transform pipeline needs.
///
/// Handles are owned values; dropping one releases the resource. A device is
/// single-owner and must not be shared between threads mid-render.
pub trait RenderDevice {
    /// One compiled stage.
    type Shader;
    /// Linked vertex + fragment program.
    type Program;
    /// Static vertex buffer.
    type Buffer;
    /// Uploaded image plus its sampler.
    type Texture;
    /// Uniform values and texture bound for one draw.
    type Bindings;
    /// Output surface the draw writes into.
    type Target;

    /// Largest width or height a texture or target may have.
    fn max_texture_dimension(&self) -> u32;

    /// Allocates an output surface of exactly `width × height`.
    ///
    /// A size over [`max_texture_dimension`](Self::max_texture_dimension) is a
    /// [`TextureUploadFailure`](crate::FilterError::TextureUploadFailure).
    fn create_target(&mut self, width: u32, height: u32) -> Result<Self::Target>;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader>;

    /// Links two compiled stages. Consumes them; they are not needed afterwards.
    fn link_program(&mut self, vertex: Self::Shader, fragment: Self::Shader)
        -> Result<Self::Program>;

    fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> Result<Self::Buffer>;

    /// Copies `image` to a new texture sampled clamp-to-edge with nearest
    /// filtering. Callers validate size and length first.
    fn create_texture(&mut self, image: &Image) -> Result<Self::Texture>;

    fn bind_uniforms(
        &mut self,
        program: &Self::Program,
        texture: &Self::Texture,
        uniforms: &FilterUniforms,
    ) -> Result<Self::Bindings>;

    /// Draws `pass` into `target` and returns the result as a packed RGBA8 image.
    fn draw(&mut self, target: Self::Target, pass: DrawPass<'_, Self>) -> Result<Image>;
}

/// Everything bound for a single draw call.
pub struct DrawPass<'a, D: RenderDevice + ?Sized> {
    pub program: &'a D::Program,
    pub bindings: &'a D::Bindings,
    pub positions: &'a D::Buffer,
    pub tex_coords: &'a D::Buffer,
    pub vertex_count: u32,
}

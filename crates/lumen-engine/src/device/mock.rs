//! Recording device for tests.
//!
//! Logs every call, can be told to fail a given step, and evaluates the
//! fragment-stage arithmetic on the CPU so pipeline output can be checked
//! without hardware.

use super::{DrawPass, RenderDevice};
use crate::error::{FilterError, Result, ShaderStage};
use crate::image::Image;
use crate::render::{ensure_fits, FilterUniforms, QUAD_VERTEX_COUNT};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateTarget(u32, u32),
    Compile(ShaderStage),
    Link,
    VertexBuffer(Vec<f32>),
    Texture(u32, u32),
    Bind(FilterUniforms),
    Draw(u32),
}

/// Step the mock should fail at.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum FailAt {
    Target,
    Compile(ShaderStage),
    Link,
}

pub(crate) struct MockDevice {
    pub calls: Vec<Call>,
    pub fail_at: Option<FailAt>,
    pub max_dim: u32,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            fail_at: None,
            max_dim: 8192,
        }
    }

    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at: Some(fail_at),
            ..Self::new()
        }
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

pub(crate) struct MockBindings {
    texture: Image,
    uniforms: FilterUniforms,
}

impl RenderDevice for MockDevice {
    type Shader = ShaderStage;
    type Program = ();
    type Buffer = Vec<f32>;
    type Texture = Image;
    type Bindings = MockBindings;
    type Target = (u32, u32);

    fn max_texture_dimension(&self) -> u32 {
        self.max_dim
    }

    fn create_target(&mut self, width: u32, height: u32) -> Result<(u32, u32)> {
        if self.fail_at == Some(FailAt::Target) {
            return Err(FilterError::context_unavailable("mock: no adapter"));
        }
        ensure_fits(&*self, width, height)?;
        self.calls.push(Call::CreateTarget(width, height));
        Ok((width, height))
    }

    fn compile_shader(&mut self, stage: ShaderStage, _source: &str) -> Result<ShaderStage> {
        self.calls.push(Call::Compile(stage));
        if self.fail_at == Some(FailAt::Compile(stage)) {
            return Err(FilterError::shader(stage, "mock: syntax error"));
        }
        Ok(stage)
    }

    fn link_program(&mut self, _vertex: ShaderStage, _fragment: ShaderStage) -> Result<()> {
        self.calls.push(Call::Link);
        if self.fail_at == Some(FailAt::Link) {
            return Err(FilterError::shader(ShaderStage::Link, "mock: interface mismatch"));
        }
        Ok(())
    }

    fn create_vertex_buffer(&mut self, _label: &str, data: &[f32]) -> Result<Vec<f32>> {
        self.calls.push(Call::VertexBuffer(data.to_vec()));
        Ok(data.to_vec())
    }

    fn create_texture(&mut self, image: &Image) -> Result<Image> {
        self.calls.push(Call::Texture(image.width, image.height));
        Ok(image.clone())
    }

    fn bind_uniforms(
        &mut self,
        _program: &(),
        texture: &Image,
        uniforms: &FilterUniforms,
    ) -> Result<MockBindings> {
        self.calls.push(Call::Bind(*uniforms));
        Ok(MockBindings {
            texture: texture.clone(),
            uniforms: *uniforms,
        })
    }

    fn draw(&mut self, target: (u32, u32), pass: DrawPass<'_, Self>) -> Result<Image> {
        self.calls.push(Call::Draw(pass.vertex_count));
        assert_eq!(pass.vertex_count, QUAD_VERTEX_COUNT);

        let (width, height) = target;
        let source = &pass.bindings.texture;
        let transform = pass.bindings.uniforms.transform_block();

        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let px = source.pixel(x, y).unwrap_or([0; 4]);
                let color = px.map(|c| c as f32 / 255.0);
                pixels.extend(shade(color, &transform.matrix, &transform.offset));
            }
        }
        Ok(Image::from_rgba8(width, height, pixels))
    }
}

/// CPU rendition of `fs_main` plus unorm8 store.
fn shade(color: [f32; 4], matrix: &[[f32; 4]; 4], offset: &[f32; 4]) -> [u8; 4] {
    let mut out = [0u8; 4];
    for (i, column) in matrix.iter().enumerate() {
        // product = diag(color) * matrix; column i of the product summed.
        let sum: f32 = (0..4).map(|k| color[k] * column[k]).sum::<f32>() + offset[i];
        out[i] = (sum.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    out
}

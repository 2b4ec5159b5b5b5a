use crate::device::RenderDevice;
use crate::error::{Result, ShaderStage};

/// Pixel-space quad to clip space; passes texture coordinates through.
pub const VERTEX_SHADER: &str = include_str!("shaders/color_matrix.vert.wgsl");

/// Samples the source texel and applies the affine color transform.
pub const FRAGMENT_SHADER: &str = include_str!("shaders/color_matrix.frag.wgsl");

/// Entry points expected in the two stage sources.
pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Compiles both stages and links them into a program.
///
/// Stages are compiled independently so a failure names the stage at fault.
/// Nothing is returned unless linking succeeds.
pub fn build_program<D: RenderDevice + ?Sized>(
    device: &mut D,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<D::Program> {
    let vertex = device.compile_shader(ShaderStage::Vertex, vertex_source)?;
    let fragment = device.compile_shader(ShaderStage::Fragment, fragment_source)?;
    let program = device.link_program(vertex, fragment)?;
    log::debug!("color matrix program linked");
    Ok(program)
}

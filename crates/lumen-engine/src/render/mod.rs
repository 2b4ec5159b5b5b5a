//! GPU color transform pipeline.
//!
//! Stages, leaves first: program build, quad geometry, texture upload,
//! uniforms, and the [`ColorMatrixRenderer`] that drives them in order.
//!
//! Convention:
//! - CPU geometry is in image pixels (top-left origin, +Y down).
//! - Vertex shader converts to NDC using the resolution uniform.

mod geometry;
mod program;
mod renderer;
mod texture;
pub(crate) mod uniforms;

pub use geometry::{upload_quad, QuadGeometry, QUAD_VERTEX_COUNT};
pub use program::{build_program, FRAGMENT_ENTRY, FRAGMENT_SHADER, VERTEX_ENTRY, VERTEX_SHADER};
pub use renderer::{ColorMatrixRenderer, RenderState};
pub use texture::{ensure_fits, upload_texture};
pub use uniforms::{ColorTransformUniform, FilterUniforms, ResolutionUniform};

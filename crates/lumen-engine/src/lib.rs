//! GPU color matrix filter.
//!
//! Applies a 5×4 affine color matrix (SVG `feColorMatrix` semantics) to an
//! RGBA8 image by drawing a full-surface quad through a fragment shader.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`matrix`] | `ColorMatrix`, `decompose` into linear part + offsets |
//! | [`render`] | program build, quad geometry, texture upload, `ColorMatrixRenderer` |
//! | [`device`] | `RenderDevice` abstraction and the wgpu `Gpu` context |
//! | [`presets`] | named filter lookup |
//! | [`logging`] | `env_logger` setup |
//!
//! ```no_run
//! use lumen_engine::{presets, ColorMatrixRenderer, Image};
//!
//! let image = Image::filled(64, 64, [255, 0, 0, 255]);
//! let mut renderer = ColorMatrixRenderer::new()?;
//! let sepia = presets::lookup("sepia").unwrap();
//! let out = renderer.render_matrix(&image, &sepia)?;
//! assert_eq!((out.width, out.height), (64, 64));
//! # Ok::<(), lumen_engine::FilterError>(())
//! ```

pub mod device;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod presets;
pub mod render;

mod image;

pub use device::{DeviceInit, Gpu, RenderDevice};
pub use error::{FilterError, Result, ShaderStage};
pub use image::{FilteredImage, Image};
pub use matrix::{decompose, ColorMatrix, LinearMatrix4, OffsetVector4};
pub use render::{ColorMatrixRenderer, RenderState};

/// One-shot filter: acquires a GPU context, renders, and releases it.
///
/// Hosts filtering more than one image should keep a [`ColorMatrixRenderer`]
/// instead so the context and compiled program are reused.
pub fn render(image: &Image, matrix: &[f32]) -> Result<FilteredImage> {
    error::ensure_dimensions(image.width, image.height)?;
    ColorMatrixRenderer::new()?.render(image, matrix)
}

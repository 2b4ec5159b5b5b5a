use crate::device::RenderDevice;
use crate::error::{ensure_dimensions, FilterError, Result};
use crate::image::Image;

/// Fails with [`FilterError::TextureUploadFailure`] when a `width × height`
/// image cannot be held by `device`.
///
/// Runs before the output surface is allocated, so an oversize input is
/// reported as an upload error and never as a missing context.
pub fn ensure_fits<D: RenderDevice + ?Sized>(device: &D, width: u32, height: u32) -> Result<()> {
    let max = device.max_texture_dimension();
    if width > max || height > max {
        return Err(FilterError::texture_upload(format!(
            "{width}x{height} exceeds the device texture limit of {max}"
        )));
    }
    Ok(())
}

/// Copies `image` into a new GPU texture.
///
/// The device samples it clamp-to-edge with nearest filtering and no mip
/// chain, so one output pixel maps to exactly one source texel. The copy is
/// one-shot: later changes to `image.pixels` are not seen by the returned
/// texture.
pub fn upload_texture<D: RenderDevice + ?Sized>(device: &mut D, image: &Image) -> Result<D::Texture> {
    ensure_dimensions(image.width, image.height)?;

    if image.pixels.len() != image.expected_len() {
        return Err(FilterError::texture_upload(format!(
            "pixel buffer is {} bytes, a {}x{} RGBA8 image needs {}",
            image.pixels.len(),
            image.width,
            image.height,
            image.expected_len()
        )));
    }

    ensure_fits(device, image.width, image.height)?;
    device.create_texture(image)
}

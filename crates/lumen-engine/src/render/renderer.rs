use crate::device::{DeviceInit, DrawPass, Gpu, RenderDevice};
use crate::error::{ensure_dimensions, FilterError, Result};
use crate::image::{FilteredImage, Image};
use crate::matrix::{decompose, ColorMatrix};

use super::geometry::{upload_quad, QUAD_VERTEX_COUNT};
use super::program::{build_program, FRAGMENT_SHADER, VERTEX_SHADER};
use super::texture::{ensure_fits, upload_texture};
use super::uniforms::FilterUniforms;

/// Progress of the most recent [`ColorMatrixRenderer::render`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    Uninitialized,
    ContextAcquired,
    ProgramReady,
    GeometryReady,
    TextureReady,
    UniformsBound,
    Rendered,
    /// Terminal. Holds the error the call returned.
    Failed(FilterError),
}

/// Applies one color matrix to one image per call.
///
/// Owns its rendering context. The linked program is kept across calls;
/// buffers, textures and uniforms are allocated fresh for every image so no
/// state carries from one call to the next.
///
/// Calls are synchronous and serialized by `&mut self`. For concurrent
/// filtering, create one renderer (and so one device) per thread.
pub struct ColorMatrixRenderer<D: RenderDevice = Gpu> {
    device: D,
    program: Option<D::Program>,
    state: RenderState,
}

impl ColorMatrixRenderer<Gpu> {
    /// Acquires a GPU context with default settings.
    pub fn new() -> Result<Self> {
        Self::with_init(&DeviceInit::default())
    }

    pub fn with_init(init: &DeviceInit) -> Result<Self> {
        Ok(Self::with_device(Gpu::acquire(init)?))
    }
}

impl<D: RenderDevice> ColorMatrixRenderer<D> {
    pub fn with_device(device: D) -> Self {
        Self {
            device,
            program: None,
            state: RenderState::Uninitialized,
        }
    }

    #[inline]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Renders `image` through `matrix` (20 coefficients, row-major).
    ///
    /// Returns a new image of the same size. Any failing step aborts the
    /// call; nothing partial is returned.
    pub fn render(&mut self, image: &Image, matrix: &[f32]) -> Result<FilteredImage> {
        self.state = RenderState::Uninitialized;
        match self.run(image, matrix) {
            Ok(out) => Ok(out),
            Err(e) => {
                log::debug!("color matrix render failed in {:?}: {e}", self.state);
                self.state = RenderState::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// Same as [`render`](Self::render) for an already shaped matrix.
    pub fn render_matrix(&mut self, image: &Image, matrix: &ColorMatrix) -> Result<FilteredImage> {
        self.render(image, matrix.as_slice())
    }

    fn run(&mut self, image: &Image, matrix: &[f32]) -> Result<FilteredImage> {
        let (width, height) = (image.width, image.height);
        ensure_dimensions(width, height)?;

        let state = &mut self.state;
        let device = &mut self.device;

        ensure_fits(&*device, width, height)?;
        let target = device.create_target(width, height)?;
        advance(state, RenderState::ContextAcquired);

        let program = match self.program {
            Some(ref program) => program,
            None => self
                .program
                .insert(build_program(device, VERTEX_SHADER, FRAGMENT_SHADER)?),
        };
        advance(state, RenderState::ProgramReady);

        let (linear, offset) = decompose(matrix)?;

        let (positions, tex_coords) = upload_quad(device, width, height)?;
        advance(state, RenderState::GeometryReady);

        let texture = upload_texture(device, image)?;
        advance(state, RenderState::TextureReady);

        let uniforms = FilterUniforms::new(width, height, linear, offset);
        let bindings = device.bind_uniforms(program, &texture, &uniforms)?;
        advance(state, RenderState::UniformsBound);

        let out = device.draw(
            target,
            DrawPass {
                program,
                bindings: &bindings,
                positions: &positions,
                tex_coords: &tex_coords,
                vertex_count: QUAD_VERTEX_COUNT,
            },
        )?;
        advance(state, RenderState::Rendered);
        Ok(out)
    }
}

fn advance(state: &mut RenderState, next: RenderState) {
    log::debug!("color matrix render -> {next:?}");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{Call, FailAt, MockDevice};
    use crate::error::ShaderStage;
    use crate::presets;

    fn renderer() -> ColorMatrixRenderer<MockDevice> {
        ColorMatrixRenderer::with_device(MockDevice::new())
    }

    fn gradient(width: u32, height: u32) -> Image {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 40) as u8, (y * 60) as u8, 128, 200]);
            }
        }
        Image::from_rgba8(width, height, pixels)
    }

    // ── happy path ────────────────────────────────────────────────────────

    #[test]
    fn identity_reproduces_input() {
        let mut r = renderer();
        let img = gradient(5, 4);
        let out = r.render_matrix(&img, &ColorMatrix::IDENTITY).unwrap();
        assert_eq!(out, img);
        assert_eq!(r.state(), &RenderState::Rendered);
    }

    #[test]
    fn grayscale_on_pure_red() {
        let mut r = renderer();
        let img = Image::filled(2, 2, [255, 0, 0, 255]);
        let gray = presets::lookup("grayscale").unwrap();
        let out = r.render_matrix(&img, &gray).unwrap();

        let luma = (gray.get(0, 0) * 255.0).round() as u8;
        assert_eq!(out.pixel(1, 1), Some([luma, luma, luma, 255]));
    }

    #[test]
    fn zero_matrix_with_alpha_offset() {
        let mut matrix = [0.0f32; 20];
        matrix[19] = 1.0;
        let mut r = renderer();
        let img = Image::filled(3, 3, [10, 200, 30, 64]);
        let out = r.render(&img, &matrix).unwrap();
        // Alpha row has no input weights, so alpha is the offset alone.
        assert!(out.pixels.chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn zero_matrix_with_identity_alpha_row() {
        let mut matrix = [0.0f32; 20];
        matrix[18] = 1.0;
        let mut r = renderer();
        let img = Image::filled(3, 3, [10, 200, 30, 64]);
        let out = r.render(&img, &matrix).unwrap();
        assert!(out.pixels.chunks(4).all(|px| px == [0, 0, 0, 64]));
    }

    #[test]
    fn sequential_renders_are_independent() {
        let mut r = renderer();
        let img = gradient(4, 4);

        let inverted = r.render_matrix(&img, &presets::lookup("invert").unwrap()).unwrap();
        let identity = r.render_matrix(&img, &ColorMatrix::IDENTITY).unwrap();

        assert_eq!(identity, img);
        assert_ne!(inverted, identity);
        assert_eq!(inverted.pixel(0, 0), Some([255, 255, 127, 200]));
    }

    #[test]
    fn output_matches_input_size() {
        let mut r = renderer();
        let out = r.render_matrix(&gradient(7, 2), &ColorMatrix::IDENTITY).unwrap();
        assert_eq!((out.width, out.height), (7, 2));
        assert_eq!(out.pixels.len(), out.expected_len());
    }

    // ── pipeline wiring ───────────────────────────────────────────────────

    #[test]
    fn steps_run_in_order() {
        let mut r = renderer();
        r.render_matrix(&gradient(2, 3), &ColorMatrix::IDENTITY).unwrap();

        let calls = &r.device().calls;
        assert_eq!(calls[0], Call::CreateTarget(2, 3));
        assert_eq!(calls[1], Call::Compile(ShaderStage::Vertex));
        assert_eq!(calls[2], Call::Compile(ShaderStage::Fragment));
        assert_eq!(calls[3], Call::Link);
        assert!(matches!(calls[4], Call::VertexBuffer(_)));
        assert!(matches!(calls[5], Call::VertexBuffer(_)));
        assert_eq!(calls[6], Call::Texture(2, 3));
        assert!(matches!(calls[7], Call::Bind(_)));
        assert_eq!(calls[8], Call::Draw(QUAD_VERTEX_COUNT));
    }

    #[test]
    fn uniforms_carry_resolution_and_split_matrix() {
        let mut r = renderer();
        let matrix: Vec<f32> = (0..20).map(|i| i as f32 * 0.01).collect();
        r.render(&gradient(6, 3), &matrix).unwrap();

        let bound = r.device().calls.iter().find_map(|c| match c {
            Call::Bind(u) => Some(*u),
            _ => None,
        });
        let (linear, offset) = decompose(&matrix).unwrap();
        assert_eq!(bound, Some(FilterUniforms::new(6, 3, linear, offset)));
    }

    #[test]
    fn program_is_built_once() {
        let mut r = renderer();
        let img = gradient(2, 2);
        r.render_matrix(&img, &ColorMatrix::IDENTITY).unwrap();
        r.render_matrix(&img, &ColorMatrix::grayscale()).unwrap();

        assert_eq!(r.device().count(|c| *c == Call::Link), 1);
        assert_eq!(r.device().count(|c| matches!(c, Call::Texture(..))), 2);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn zero_width_fails_before_any_allocation() {
        let mut r = renderer();
        let err = r.render(&Image::from_rgba8(0, 4, Vec::new()), &ColorMatrix::IDENTITY.0);
        assert_eq!(err, Err(FilterError::InvalidDimensions { width: 0, height: 4 }));
        assert!(r.device().calls.is_empty());
        assert!(matches!(r.state(), RenderState::Failed(_)));
    }

    #[test]
    fn zero_height_fails_before_any_allocation() {
        let mut r = renderer();
        assert!(r.render(&Image::from_rgba8(4, 0, Vec::new()), &ColorMatrix::IDENTITY.0).is_err());
        assert!(r.device().calls.is_empty());
    }

    #[test]
    fn bad_matrix_shape_stops_before_geometry() {
        let mut r = renderer();
        let err = r.render(&gradient(2, 2), &[1.0; 19]).unwrap_err();
        assert_eq!(err, FilterError::InvalidMatrixShape { len: 19 });
        assert_eq!(r.state(), &RenderState::Failed(err));
        assert_eq!(r.device().count(|c| matches!(c, Call::VertexBuffer(_))), 0);
        assert_eq!(r.device().count(|c| matches!(c, Call::Draw(_))), 0);
    }

    #[test]
    fn context_failure_is_reported() {
        let mut r = ColorMatrixRenderer::with_device(MockDevice::failing_at(FailAt::Target));
        let err = r.render_matrix(&gradient(2, 2), &ColorMatrix::IDENTITY).unwrap_err();
        assert!(err.is_context_unavailable());
        assert!(r.device().calls.is_empty());
    }

    #[test]
    fn fragment_compile_failure_names_stage() {
        let mut r = ColorMatrixRenderer::with_device(MockDevice::failing_at(FailAt::Compile(
            ShaderStage::Fragment,
        )));
        let err = r.render_matrix(&gradient(2, 2), &ColorMatrix::IDENTITY).unwrap_err();
        assert!(matches!(
            err,
            FilterError::ShaderBuildFailure { stage: ShaderStage::Fragment, .. }
        ));
        assert_eq!(r.device().count(|c| *c == Call::Link), 0);
    }

    #[test]
    fn link_failure_is_not_cached() {
        let mut r = ColorMatrixRenderer::with_device(MockDevice::failing_at(FailAt::Link));
        let img = gradient(2, 2);
        assert!(r.render_matrix(&img, &ColorMatrix::IDENTITY).is_err());
        assert!(r.render_matrix(&img, &ColorMatrix::IDENTITY).is_err());
        // Second call retried the build; no half-built program was kept.
        assert_eq!(r.device().count(|c| *c == Call::Link), 2);
        assert_eq!(r.device().count(|c| matches!(c, Call::Draw(_))), 0);
    }

    #[test]
    fn short_pixel_buffer_fails_upload() {
        let mut r = renderer();
        let img = Image::from_rgba8(2, 2, vec![0; 15]);
        let err = r.render_matrix(&img, &ColorMatrix::IDENTITY).unwrap_err();
        assert!(matches!(err, FilterError::TextureUploadFailure { .. }));
        assert_eq!(r.device().count(|c| matches!(c, Call::Texture(..))), 0);
    }

    #[test]
    fn oversize_image_fails_upload() {
        let mut device = MockDevice::new();
        device.max_dim = 4;
        let mut r = ColorMatrixRenderer::with_device(device);
        let err = r
            .render_matrix(&Image::filled(5, 1, [0; 4]), &ColorMatrix::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, FilterError::TextureUploadFailure { .. }));
        assert!(!err.is_context_unavailable());
        // Rejected before the output surface is allocated.
        assert_eq!(r.device().count(|c| matches!(c, Call::CreateTarget(..))), 0);
        assert_eq!(r.state(), &RenderState::Failed(err));
    }

    #[test]
    fn image_at_the_limit_renders() {
        let mut device = MockDevice::new();
        device.max_dim = 4;
        let mut r = ColorMatrixRenderer::with_device(device);
        let img = Image::filled(4, 1, [9, 8, 7, 6]);
        assert_eq!(r.render_matrix(&img, &ColorMatrix::IDENTITY).unwrap(), img);
    }

    #[test]
    fn oversize_target_is_an_upload_failure() {
        let mut device = MockDevice::new();
        device.max_dim = 4;
        let err = device.create_target(1, 5).unwrap_err();
        assert!(matches!(err, FilterError::TextureUploadFailure { .. }));
    }

    #[test]
    fn failure_then_success_resets_state() {
        let mut r = renderer();
        let img = gradient(2, 2);
        assert!(r.render(&img, &[0.0; 21]).is_err());
        r.render_matrix(&img, &ColorMatrix::IDENTITY).unwrap();
        assert_eq!(r.state(), &RenderState::Rendered);
    }
}

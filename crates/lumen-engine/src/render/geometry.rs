use crate::device::RenderDevice;
use crate::error::{ensure_dimensions, Result};

/// Vertices in the full-surface quad (two triangles).
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// Position and texture coordinates of a two-triangle quad.
///
/// Positions are image pixels covering `[0, width] × [0, height]`; texture
/// coordinates cover `[0, 1] × [0, 1]`. Vertex `i` of one buffer pairs with
/// vertex `i` of the other.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadGeometry {
    pub positions: [f32; 12],
    pub tex_coords: [f32; 12],
}

#[rustfmt::skip]
const TEX_COORDS: [f32; 12] = [
    0.0, 0.0,
    1.0, 0.0,
    0.0, 1.0,
    0.0, 1.0,
    1.0, 0.0,
    1.0, 1.0,
];

impl QuadGeometry {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        ensure_dimensions(width, height)?;

        let (w, h) = (width as f32, height as f32);
        // Same corner order as TEX_COORDS, scaled to pixels.
        let mut positions = TEX_COORDS;
        for xy in positions.chunks_exact_mut(2) {
            xy[0] *= w;
            xy[1] *= h;
        }

        Ok(Self {
            positions,
            tex_coords: TEX_COORDS,
        })
    }
}

/// Uploads the quad for a `width × height` image. Returns
/// `(positions, tex_coords)` vertex buffers.
pub fn upload_quad<D: RenderDevice + ?Sized>(
    device: &mut D,
    width: u32,
    height: u32,
) -> Result<(D::Buffer, D::Buffer)> {
    let quad = QuadGeometry::new(width, height)?;
    let positions = device.create_vertex_buffer("lumen quad positions", &quad.positions)?;
    let tex_coords = device.create_vertex_buffer("lumen quad tex coords", &quad.tex_coords)?;
    Ok((positions, tex_coords))
}

use crate::error::{FilterError, Result};

use super::color_matrix::{ColorMatrix, COLOR_MATRIX_LEN};

/// Multiplicative 4×4 part of a color matrix.
///
/// Stored with one output channel per group of four, which is also the
/// column-major layout the fragment stage reads as `mat4x4<f32>`: column `i`
/// holds the weights of output channel `i`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearMatrix4(pub [f32; 16]);

/// Constant term of each output channel, added after the multiply.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OffsetVector4(pub [f32; 4]);

impl LinearMatrix4 {
    /// Columns as the GPU sees them.
    pub fn columns(&self) -> [[f32; 4]; 4] {
        let m = &self.0;
        [
            [m[0], m[1], m[2], m[3]],
            [m[4], m[5], m[6], m[7]],
            [m[8], m[9], m[10], m[11]],
            [m[12], m[13], m[14], m[15]],
        ]
    }
}

/// Splits a 20-coefficient color matrix into its linear part and offsets.
///
/// The constant term of row `r` lives at flat index `5 * r + 4`. Everything
/// else keeps its relative order. Values pass through untouched.
pub fn decompose(matrix: &[f32]) -> Result<(LinearMatrix4, OffsetVector4)> {
    if matrix.len() != COLOR_MATRIX_LEN {
        return Err(FilterError::InvalidMatrixShape { len: matrix.len() });
    }

    let mut linear = [0.0f32; 16];
    let mut offset = [0.0f32; 4];
    for (row, coefficients) in matrix.chunks_exact(5).enumerate() {
        linear[row * 4..row * 4 + 4].copy_from_slice(&coefficients[..4]);
        offset[row] = coefficients[4];
    }

    Ok((LinearMatrix4(linear), OffsetVector4(offset)))
}

/// Inverse of [`decompose`].
pub fn recompose(linear: &LinearMatrix4, offset: &OffsetVector4) -> ColorMatrix {
    let mut out = [0.0f32; COLOR_MATRIX_LEN];
    for row in 0..4 {
        out[row * 5..row * 5 + 4].copy_from_slice(&linear.0[row * 4..row * 4 + 4]);
        out[row * 5 + 4] = offset.0[row];
    }
    ColorMatrix(out)
}

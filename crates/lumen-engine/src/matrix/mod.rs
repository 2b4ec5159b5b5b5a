//! Color matrix types and the split into linear part + offsets.

mod color_matrix;
mod decompose;

pub use color_matrix::{ColorMatrix, MatrixParseError, COLOR_MATRIX_LEN};
pub use decompose::{decompose, recompose, LinearMatrix4, OffsetVector4};

use crate::error::{FilterError, Result};

/// Number of coefficients in an affine color matrix (4 rows of 5).
pub const COLOR_MATRIX_LEN: usize = 20;

/// 5-column × 4-row affine color transform, row-major.
///
/// For each output channel `c` in R, G, B, A:
/// `out[c] = M[c][0]*R + M[c][1]*G + M[c][2]*B + M[c][3]*A + M[c][4]`,
/// with channels normalized to `[0, 1]`. Same semantics as SVG
/// `feColorMatrix type="matrix"`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorMatrix(pub [f32; COLOR_MATRIX_LEN]);

/// Rec. 709 luma weights used by the SVG color matrix shorthands.
const LUMA_R: f32 = 0.2125;
const LUMA_G: f32 = 0.7154;
const LUMA_B: f32 = 0.0721;

impl ColorMatrix {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Coefficient at `row` (output channel) and `col` (input channel, or 4
    /// for the constant term).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[row * 5 + col]
    }

    /// SVG `feColorMatrix type="saturate"`. `0.0` is fully desaturated, `1.0`
    /// is the identity. Values above 1 oversaturate.
    #[rustfmt::skip]
    pub fn saturate(s: f32) -> Self {
        Self([
            0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s, 0.0, 0.0,
            0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s, 0.0, 0.0,
            0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s, 0.0, 0.0,
            0.0,               0.0,               0.0,               1.0, 0.0,
        ])
    }

    /// SVG `feColorMatrix type="hueRotate"`.
    #[rustfmt::skip]
    pub fn hue_rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self([
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
            0.0, 0.0,

            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
            0.0, 0.0,

            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
            0.0, 0.0,

            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    /// SVG `feColorMatrix type="luminanceToAlpha"`.
    #[rustfmt::skip]
    pub fn luminance_to_alpha() -> Self {
        Self([
            0.0,    0.0,    0.0,    0.0, 0.0,
            0.0,    0.0,    0.0,    0.0, 0.0,
            0.0,    0.0,    0.0,    0.0, 0.0,
            LUMA_R, LUMA_G, LUMA_B, 0.0, 0.0,
        ])
    }

    /// Grayscale using the Rec. 709 luma weights; alpha untouched.
    #[rustfmt::skip]
    pub fn grayscale() -> Self {
        Self([
            LUMA_R, LUMA_G, LUMA_B, 0.0, 0.0,
            LUMA_R, LUMA_G, LUMA_B, 0.0, 0.0,
            LUMA_R, LUMA_G, LUMA_B, 0.0, 0.0,
            0.0,    0.0,    0.0,    1.0, 0.0,
        ])
    }

    /// Parses 20 coefficients separated by whitespace and/or commas.
    pub fn parse(text: &str) -> std::result::Result<Self, MatrixParseError> {
        let values = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .enumerate()
            .map(|(index, token)| {
                token.parse::<f32>().map_err(|_| MatrixParseError::InvalidNumber {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<std::result::Result<Vec<f32>, _>>()?;

        Ok(Self::try_from(values.as_slice())?)
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<&[f32]> for ColorMatrix {
    type Error = FilterError;

    fn try_from(values: &[f32]) -> Result<Self> {
        let coefficients: [f32; COLOR_MATRIX_LEN] = values
            .try_into()
            .map_err(|_| FilterError::InvalidMatrixShape { len: values.len() })?;
        Ok(Self(coefficients))
    }
}

impl TryFrom<Vec<f32>> for ColorMatrix {
    type Error = FilterError;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        Self::try_from(values.as_slice())
    }
}

impl AsRef<[f32]> for ColorMatrix {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Failure to read a color matrix from text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixParseError {
    #[error("coefficient {index} ({token:?}) is not a number")]
    InvalidNumber { index: usize, token: String },

    #[error(transparent)]
    Shape(#[from] FilterError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn try_from_rejects_wrong_length() {
        let short = [0.0f32; 19];
        assert_eq!(
            ColorMatrix::try_from(&short[..]),
            Err(FilterError::InvalidMatrixShape { len: 19 })
        );
        assert!(ColorMatrix::try_from(vec![0.0; 21]).is_err());
        assert!(ColorMatrix::try_from(vec![0.0; 20]).is_ok());
    }

    #[test]
    fn saturate_one_is_identity() {
        let m = ColorMatrix::saturate(1.0);
        for (a, b) in m.0.iter().zip(ColorMatrix::IDENTITY.0.iter()) {
            assert_close(*a, *b);
        }
    }

    #[test]
    fn hue_rotate_zero_is_identity() {
        let m = ColorMatrix::hue_rotate(0.0);
        for (a, b) in m.0.iter().zip(ColorMatrix::IDENTITY.0.iter()) {
            assert_close(*a, *b);
        }
    }

    #[test]
    fn hue_rotate_is_not_symmetric() {
        let m = ColorMatrix::hue_rotate(90.0);
        assert!((m.get(0, 1) - m.get(1, 0)).abs() > 1e-3);
    }

    #[test]
    fn saturate_rows_preserve_white() {
        // Each RGB row sums to 1 for any saturation, so white stays white.
        let m = ColorMatrix::saturate(0.3);
        for row in 0..3 {
            assert_close(m.get(row, 0) + m.get(row, 1) + m.get(row, 2), 1.0);
        }
    }

    #[test]
    fn luminance_to_alpha_only_writes_alpha() {
        let m = ColorMatrix::luminance_to_alpha();
        assert!(m.0[..15].iter().all(|v| *v == 0.0));
        assert_close(m.get(3, 0), LUMA_R);
    }

    #[test]
    fn parse_accepts_commas_and_whitespace() {
        let text = "1,0,0,0,0  0 1 0 0 0\n0, 0, 1, 0, 0, 0 0 0 1 0";
        assert_eq!(ColorMatrix::parse(text), Ok(ColorMatrix::IDENTITY));
    }

    #[test]
    fn parse_reports_bad_token() {
        let err = ColorMatrix::parse("1 0 x").unwrap_err();
        assert_eq!(
            err,
            MatrixParseError::InvalidNumber { index: 2, token: "x".into() }
        );
    }

    #[test]
    fn parse_reports_shape() {
        let err = ColorMatrix::parse("1 2 3").unwrap_err();
        assert_eq!(err, MatrixParseError::Shape(FilterError::InvalidMatrixShape { len: 3 }));
    }
}

//! Named filter table.
//!
//! Maps a filter identifier to its color matrix. Offsets are in normalized
//! `[0, 1]` channel units. Unknown names resolve to `None`, which callers treat
//! as "no filter" and show the source image unchanged.

use crate::matrix::ColorMatrix;

/// Canonical preset names, in display order.
pub const NAMES: &[&str] = &[
    "identity",
    "grayscale",
    "sepia",
    "invert",
    "luminance_to_alpha",
    "saturate",
    "desaturate",
    "hue_rotate_90",
    "hue_rotate_180",
    "blue_monotone",
    "violent_tomato",
    "warm",
    "cool",
    "brightness",
    "contrast",
    "vintage",
    "night_vision",
    "polaroid",
    "kodachrome",
    "technicolor",
];

#[inline]
pub fn names() -> &'static [&'static str] {
    NAMES
}

/// Resolves a filter identifier. Case-insensitive; `-`, `_` and spaces are
/// interchangeable.
pub fn lookup(name: &str) -> Option<ColorMatrix> {
    let key: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect();

    let matrix = match key.as_str() {
        "identity" | "none" | "original" => ColorMatrix::IDENTITY,
        "grayscale" | "greyscale" | "grey" | "gray" => ColorMatrix::grayscale(),
        "sepia" => SEPIA,
        "invert" | "negative" => INVERT,
        "luminance_to_alpha" => ColorMatrix::luminance_to_alpha(),
        "saturate" | "saturation" => ColorMatrix::saturate(1.5),
        "desaturate" => ColorMatrix::saturate(0.5),
        "hue_rotate_90" => ColorMatrix::hue_rotate(90.0),
        "hue_rotate_180" => ColorMatrix::hue_rotate(180.0),
        "blue_monotone" => monotone([0.35, 0.55, 1.0]),
        "violent_tomato" => VIOLENT_TOMATO,
        "warm" => WARM,
        "cool" => COOL,
        "brightness" | "bright" => BRIGHTNESS,
        "contrast" => contrast(1.25),
        "vintage" => VINTAGE,
        "night_vision" => NIGHT_VISION,
        "polaroid" => POLAROID,
        "kodachrome" => KODACHROME,
        "technicolor" => TECHNICOLOR,
        _ => return None,
    };
    Some(matrix)
}

/// Luma-weighted grayscale tinted towards `tint`.
fn monotone(tint: [f32; 3]) -> ColorMatrix {
    let gray = ColorMatrix::grayscale();
    let mut out = gray.0;
    for (row, t) in tint.iter().enumerate() {
        for col in 0..3 {
            out[row * 5 + col] = gray.get(row, col) * t;
        }
    }
    ColorMatrix(out)
}

/// Scales RGB around mid-gray.
#[rustfmt::skip]
fn contrast(amount: f32) -> ColorMatrix {
    let t = (1.0 - amount) * 0.5;
    ColorMatrix([
        amount, 0.0,    0.0,    0.0, t,
        0.0,    amount, 0.0,    0.0, t,
        0.0,    0.0,    amount, 0.0, t,
        0.0,    0.0,    0.0,    1.0, 0.0,
    ])
}

#[rustfmt::skip]
const SEPIA: ColorMatrix = ColorMatrix([
    0.393, 0.769, 0.189, 0.0, 0.0,
    0.349, 0.686, 0.168, 0.0, 0.0,
    0.272, 0.534, 0.131, 0.0, 0.0,
    0.0,   0.0,   0.0,   1.0, 0.0,
]);

#[rustfmt::skip]
const INVERT: ColorMatrix = ColorMatrix([
    -1.0,  0.0,  0.0, 0.0, 1.0,
     0.0, -1.0,  0.0, 0.0, 1.0,
     0.0,  0.0, -1.0, 0.0, 1.0,
     0.0,  0.0,  0.0, 1.0, 0.0,
]);

#[rustfmt::skip]
const VIOLENT_TOMATO: ColorMatrix = ColorMatrix([
    1.2,  0.2,  0.1, 0.0, 0.05,
    0.1,  0.6,  0.1, 0.0, 0.0,
    0.05, 0.05, 0.4, 0.0, 0.0,
    0.0,  0.0,  0.0, 1.0, 0.0,
]);

#[rustfmt::skip]
const WARM: ColorMatrix = ColorMatrix([
    1.1, 0.0, 0.0,  0.0, 0.02,
    0.0, 1.0, 0.0,  0.0, 0.0,
    0.0, 0.0, 0.85, 0.0, 0.0,
    0.0, 0.0, 0.0,  1.0, 0.0,
]);

#[rustfmt::skip]
const COOL: ColorMatrix = ColorMatrix([
    0.85, 0.0, 0.0, 0.0, 0.0,
    0.0,  1.0, 0.0, 0.0, 0.0,
    0.0,  0.0, 1.1, 0.0, 0.02,
    0.0,  0.0, 0.0, 1.0, 0.0,
]);

#[rustfmt::skip]
const BRIGHTNESS: ColorMatrix = ColorMatrix([
    1.0, 0.0, 0.0, 0.0, 0.15,
    0.0, 1.0, 0.0, 0.0, 0.15,
    0.0, 0.0, 1.0, 0.0, 0.15,
    0.0, 0.0, 0.0, 1.0, 0.0,
]);

#[rustfmt::skip]
const VINTAGE: ColorMatrix = ColorMatrix([
    0.628,  0.320, -0.040, 0.0, 0.0378,
    0.026,  0.644,  0.033, 0.0, 0.0293,
    0.047, -0.085,  0.524, 0.0, 0.0202,
    0.0,    0.0,    0.0,   1.0, 0.0,
]);

#[rustfmt::skip]
const NIGHT_VISION: ColorMatrix = ColorMatrix([
    0.1, 0.4, 0.0, 0.0, 0.0,
    0.3, 1.0, 0.3, 0.0, 0.05,
    0.0, 0.4, 0.1, 0.0, 0.0,
    0.0, 0.0, 0.0, 1.0, 0.0,
]);

#[rustfmt::skip]
const POLAROID: ColorMatrix = ColorMatrix([
     1.438, -0.062, -0.062, 0.0, 0.0,
    -0.122,  1.378, -0.122, 0.0, 0.0,
    -0.016, -0.016,  1.483, 0.0, 0.0,
     0.0,    0.0,    0.0,   1.0, 0.0,
]);

#[rustfmt::skip]
const KODACHROME: ColorMatrix = ColorMatrix([
     1.1286, -0.3967, -0.0399, 0.0, 0.2499,
    -0.1640,  1.0835, -0.0550, 0.0, 0.0970,
    -0.1679, -0.5603,  1.6015, 0.0, 0.1397,
     0.0,     0.0,     0.0,    1.0, 0.0,
]);

#[rustfmt::skip]
const TECHNICOLOR: ColorMatrix = ColorMatrix([
     1.9125, -0.8545, -0.0916, 0.0,  0.0462,
    -0.3088,  1.7659, -0.1060, 0.0, -0.2759,
    -0.2311, -0.7502,  1.8476, 0.0,  0.1214,
     0.0,     0.0,     0.0,    1.0,  0.0,
]);

/// Straight-alpha RGBA8 pixel buffer, row-major, top row first.
///
/// Construction does not validate anything. Dimensions are checked before any
/// GPU work starts and the buffer length is checked at texture upload, so a
/// malformed image surfaces as a typed error from the stage that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Output of a filter invocation. Same layout and size as the input image.
pub type FilteredImage = Image;

impl Image {
    #[inline]
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    /// Image where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self { width, height, pixels }
    }

    /// Number of bytes a tightly packed RGBA8 buffer of this size holds.
    #[inline]
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Returns the pixel at `(x, y)`, or `None` when out of bounds or the
    /// buffer is too short.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

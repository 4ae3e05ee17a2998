// ============================================================================
// RASTER — flat RGBA pixel buffer shared by every pipeline stage
// ============================================================================
//
// Every pixel operation in the crate consumes and produces `Raster` values.
// The invariant is simple: data.len() == width * height * 4, four interleaved
// channel bytes (R, G, B, A) per pixel, row-major. Zero-area rasters are
// legal and carry an empty buffer.
// ============================================================================

use image::RgbaImage;

/// A rectangular RGBA pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Create a raster filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 4],
        }
    }

    /// Create a raster with every pixel set to the given RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 4);
        for _ in 0..count {
            data.extend_from_slice(&rgba);
        }
        Self { width, height, data }
    }

    /// Wrap an existing buffer. Returns `None` when the length does not match
    /// width * height * 4.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self { width, height, data })
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            data: img.as_raw().clone(),
        }
    }

    /// Convert into an [`RgbaImage`] for encoding/resampling via the `image`
    /// crate. The buffer length invariant makes this infallible.
    pub fn into_rgba_image(self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.data)
            .unwrap_or_else(|| RgbaImage::new(0, 0))
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        self.clone().into_rgba_image()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when `other` has the same width and height.
    pub fn same_dimensions(&self, other: &Raster) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Byte offset of the pixel at (x, y). Callers must stay in bounds.
    #[inline]
    pub fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.pixel_index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.pixel_index(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }
}

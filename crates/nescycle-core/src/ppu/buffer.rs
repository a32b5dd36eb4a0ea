//! Output frame owned by the PPU.
//!
//! Two planes are kept side by side: the 6-bit palette index of every pixel
//! (handy for tests and debug viewers) and the same pixels packed into the
//! configured [`ColorFormat`] for a frontend to upload as-is.

use super::palette::Color;

/// How an RGB colour is packed into the colour plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorFormat {
    /// 16-bit RRRRRGGGGGGBBBBB, little endian.
    Rgb565,
    /// R, G, B.
    #[default]
    Rgb888,
    /// R, G, B, A with opaque alpha.
    Rgba8888,
    /// B, G, R, A with opaque alpha.
    Bgra8888,
}

impl ColorFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorFormat::Rgb565 => 2,
            ColorFormat::Rgb888 => 3,
            ColorFormat::Rgba8888 | ColorFormat::Bgra8888 => 4,
        }
    }

    fn pack(self, color: Color, out: &mut [u8]) {
        match self {
            ColorFormat::Rgb565 => {
                let r5 = u16::from(color.r) >> 3;
                let g6 = u16::from(color.g) >> 2;
                let b5 = u16::from(color.b) >> 3;
                let packed = (r5 << 11) | (g6 << 5) | b5;
                out.copy_from_slice(&packed.to_le_bytes());
            }
            ColorFormat::Rgb888 => out.copy_from_slice(&[color.r, color.g, color.b]),
            ColorFormat::Rgba8888 => out.copy_from_slice(&[color.r, color.g, color.b, 0xFF]),
            ColorFormat::Bgra8888 => out.copy_from_slice(&[color.b, color.g, color.r, 0xFF]),
        }
    }
}

/// 256x240 frame with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameBuffer {
    indices: Box<[u8]>,
    pixels: Box<[u8]>,
    format: ColorFormat,
    dirty: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(ColorFormat::default())
    }
}

impl FrameBuffer {
    pub const WIDTH: usize = 256;
    pub const HEIGHT: usize = 240;

    pub fn new(format: ColorFormat) -> Self {
        Self {
            indices: vec![0; Self::WIDTH * Self::HEIGHT].into_boxed_slice(),
            pixels: vec![0; Self::WIDTH * Self::HEIGHT * format.bytes_per_pixel()]
                .into_boxed_slice(),
            format,
            dirty: false,
        }
    }

    /// Packed colour plane, row-major with [`FrameBuffer::pitch`] bytes per row.
    pub fn get_data(&self) -> &[u8] {
        &self.pixels
    }

    /// Palette index plane, one byte per pixel.
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn index_at(&self, x: usize, y: usize) -> u8 {
        self.indices[y * Self::WIDTH + x]
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    pub fn pitch(&self) -> usize {
        Self::WIDTH * self.format.bytes_per_pixel()
    }

    /// `true` once the last visible pixel of a frame has been written and
    /// the consumer has not taken it yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and clears it.
    pub fn take_frame_ready(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    pub(crate) fn write_pixel(&mut self, x: usize, y: usize, index: u8, color: Color) {
        self.indices[y * Self::WIDTH + x] = index;
        let bpp = self.format.bytes_per_pixel();
        let offset = y * self.pitch() + x * bpp;
        self.format.pack(color, &mut self.pixels[offset..offset + bpp]);
    }

    pub(crate) fn mark_frame_complete(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn clear(&mut self) {
        self.indices.fill(0);
        self.pixels.fill(0);
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_pixels_in_selected_format() {
        let color = Color::new(0xF8, 0xFC, 0x08);
        let mut rgba = FrameBuffer::new(ColorFormat::Rgba8888);
        rgba.write_pixel(1, 2, 0x2A, color);
        let offset = 2 * rgba.pitch() + 4;
        assert_eq!(&rgba.get_data()[offset..offset + 4], &[0xF8, 0xFC, 0x08, 0xFF]);
        assert_eq!(rgba.index_at(1, 2), 0x2A);

        let mut rgb565 = FrameBuffer::new(ColorFormat::Rgb565);
        rgb565.write_pixel(0, 0, 0, color);
        assert_eq!(&rgb565.get_data()[..2], &0xFFE1u16.to_le_bytes());
    }

    #[test]
    fn frame_ready_is_consumed_once() {
        let mut fb = FrameBuffer::default();
        assert!(!fb.take_frame_ready());
        fb.mark_frame_complete();
        assert!(fb.is_dirty());
        assert!(fb.take_frame_ready());
        assert!(!fb.is_dirty());
    }
}

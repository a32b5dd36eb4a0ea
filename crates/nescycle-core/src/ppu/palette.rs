//! Master palette: the 64 colours a 6-bit palette RAM entry can select.

use crate::error::PaletteError;

/// Number of entries in the master palette.
pub const PALETTE_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Built-in master palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaletteKind {
    /// The NTSC 2C02 palette published on the NESdev wiki.
    #[default]
    NesdevNtsc,
    /// Luma-only rendition of [`PaletteKind::NesdevNtsc`].
    Grayscale,
}

impl PaletteKind {
    pub fn palette(self) -> Palette {
        match self {
            PaletteKind::NesdevNtsc => Palette::new(NESDEV_NTSC),
            PaletteKind::Grayscale => Palette::new(NESDEV_NTSC.map(luma)),
        }
    }
}

/// Lookup table from 6-bit colour index to RGB.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Palette {
    colors: [Color; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        PaletteKind::default().palette()
    }
}

impl Palette {
    pub const fn new(colors: [Color; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    /// Parses a `.pal` blob: 64 RGB triples (192 bytes) or 64 RGBA quads
    /// (256 bytes, alpha ignored).
    pub fn from_pal_data(data: &[u8]) -> Result<Self, PaletteError> {
        let stride = match data.len() {
            192 => 3,
            256 => 4,
            other => return Err(PaletteError::InvalidLength(other)),
        };
        let mut colors = [Color::BLACK; PALETTE_SIZE];
        for (color, chunk) in colors.iter_mut().zip(data.chunks_exact(stride)) {
            *color = Color::new(chunk[0], chunk[1], chunk[2]);
        }
        Ok(Self { colors })
    }

    /// Colour for a palette RAM value; only the low six bits are used.
    #[inline]
    pub fn to_rgb(&self, index: u8) -> Color {
        self.colors[(index & 0x3F) as usize]
    }

    pub fn as_colors(&self) -> &[Color; PALETTE_SIZE] {
        &self.colors
    }
}

fn luma(c: Color) -> Color {
    // Rec. 601 weights in fixed point.
    let y = (u32::from(c.r) * 299 + u32::from(c.g) * 587 + u32::from(c.b) * 114) / 1000;
    let y = y as u8;
    Color::new(y, y, y)
}

#[rustfmt::skip]
const NESDEV_NTSC: [Color; PALETTE_SIZE] = [
    Color::new(84, 84, 84), Color::new(0, 30, 116), Color::new(8, 16, 144), Color::new(48, 0, 136),
    Color::new(68, 0, 100), Color::new(92, 0, 48), Color::new(84, 4, 0), Color::new(60, 24, 0),
    Color::new(32, 42, 0), Color::new(8, 58, 0), Color::new(0, 64, 0), Color::new(0, 60, 0),
    Color::new(0, 50, 60), Color::new(0, 0, 0), Color::new(0, 0, 0), Color::new(0, 0, 0),
    Color::new(152, 150, 152), Color::new(8, 76, 196), Color::new(48, 50, 236), Color::new(92, 30, 228),
    Color::new(136, 20, 176), Color::new(160, 20, 100), Color::new(152, 34, 32), Color::new(120, 60, 0),
    Color::new(84, 90, 0), Color::new(40, 114, 0), Color::new(8, 124, 0), Color::new(0, 118, 40),
    Color::new(0, 102, 120), Color::new(0, 0, 0), Color::new(0, 0, 0), Color::new(0, 0, 0),
    Color::new(236, 238, 236), Color::new(76, 154, 236), Color::new(120, 124, 236), Color::new(176, 98, 236),
    Color::new(228, 84, 236), Color::new(236, 88, 180), Color::new(236, 106, 100), Color::new(212, 136, 32),
    Color::new(160, 170, 0), Color::new(116, 196, 0), Color::new(76, 208, 32), Color::new(56, 204, 108),
    Color::new(56, 180, 204), Color::new(60, 60, 60), Color::new(0, 0, 0), Color::new(0, 0, 0),
    Color::new(236, 238, 236), Color::new(168, 204, 236), Color::new(188, 188, 236), Color::new(212, 178, 236),
    Color::new(236, 174, 236), Color::new(236, 174, 212), Color::new(236, 180, 176), Color::new(228, 196, 144),
    Color::new(204, 210, 120), Color::new(180, 222, 120), Color::new(168, 226, 144), Color::new(152, 226, 180),
    Color::new(160, 214, 228), Color::new(160, 162, 160), Color::new(0, 0, 0), Color::new(0, 0, 0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_rgb_ignores_upper_bits() {
        let palette = Palette::default();
        assert_eq!(palette.to_rgb(0x00), Color::new(84, 84, 84));
        assert_eq!(palette.to_rgb(0x40), palette.to_rgb(0x00));
        assert_eq!(palette.to_rgb(0x30), Color::new(236, 238, 236));
    }

    #[test]
    fn pal_blob_lengths() {
        let rgb: Vec<u8> = (0..192).map(|i| i as u8).collect();
        let palette = Palette::from_pal_data(&rgb).expect("192-byte blob");
        assert_eq!(palette.to_rgb(1), Color::new(3, 4, 5));

        let rgba: Vec<u8> = (0..256).map(|i| i as u8).collect();
        let palette = Palette::from_pal_data(&rgba).expect("256-byte blob");
        assert_eq!(palette.to_rgb(1), Color::new(4, 5, 6));

        assert!(matches!(
            Palette::from_pal_data(&rgb[..100]),
            Err(PaletteError::InvalidLength(100))
        ));
    }

    #[test]
    fn grayscale_kind_has_equal_channels() {
        let palette = PaletteKind::Grayscale.palette();
        assert!(palette.as_colors().iter().all(|c| c.r == c.g && c.g == c.b));
    }
}

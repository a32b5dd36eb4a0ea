//! Host-tunable PPU settings.

use crate::ppu::{buffer::ColorFormat, palette::PaletteKind};

/// Settings fixed when a [`Ppu`](crate::ppu::Ppu) is built.
///
/// The defaults match what a hardware console produces; hosts usually only
/// change the palette and the colour format their renderer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PpuConfig {
    pub palette: PaletteKind,
    pub color_format: ColorFormat,
    /// Substituted when a pattern, nametable or attribute read fails.
    pub pattern_fallback: u8,
    /// Substituted when a palette read fails.
    pub palette_fallback: u8,
}

impl Default for PpuConfig {
    fn default() -> Self {
        Self {
            palette: PaletteKind::NesdevNtsc,
            color_format: ColorFormat::Rgb888,
            pattern_fallback: 0xFF,
            palette_fallback: 0x30,
        }
    }
}

impl PpuConfig {
    pub fn with_palette(mut self, palette: PaletteKind) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_color_format(mut self, color_format: ColorFormat) -> Self {
        self.color_format = color_format;
        self
    }
}

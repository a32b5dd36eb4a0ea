use bitflags::bitflags;

bitflags! {
    /// PPUMASK (`$2001`).
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// B G R S B s b g
    /// ```
    ///
    /// The emphasis bits are stored but do not affect the produced colours.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mask: u8 {
        /// Colour indices are ANDed with `0x30`.
        const GRAYSCALE = 0b0000_0001;
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;
        const SHOW_SPRITES_LEFT = 0b0000_0100;
        const SHOW_BACKGROUND = 0b0000_1000;
        const SHOW_SPRITES = 0b0001_0000;
        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

impl Mask {
    /// `true` when either background or sprite rendering is enabled.
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }

    /// Whether the background is visible at output column `col`.
    pub(crate) fn background_visible_at(self, col: u16) -> bool {
        self.contains(Mask::SHOW_BACKGROUND)
            && (col >= 8 || self.contains(Mask::SHOW_BACKGROUND_LEFT))
    }

    /// Whether sprites are visible at output column `col`.
    pub(crate) fn sprites_visible_at(self, col: u16) -> bool {
        self.contains(Mask::SHOW_SPRITES) && (col >= 8 || self.contains(Mask::SHOW_SPRITES_LEFT))
    }

    pub(crate) fn color_mask(self) -> u8 {
        if self.contains(Mask::GRAYSCALE) {
            0x30
        } else {
            0x3F
        }
    }
}

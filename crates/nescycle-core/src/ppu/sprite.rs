use bitflags::bitflags;

/// Bytes per OAM entry: Y, tile, attributes, X.
pub(crate) const OAM_ENTRY_SIZE: usize = 4;
/// Sprites the hardware can show on one scanline.
pub(crate) const SPRITES_PER_LINE: usize = 8;

bitflags! {
    /// Sprite byte 2.
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpriteAttributes: u8 {
        const PALETTE = 0b0000_0011;
        /// Drawn behind opaque background pixels.
        const PRIORITY_BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

impl SpriteAttributes {
    pub(crate) fn palette(self) -> u8 {
        self.bits() & Self::PALETTE.bits()
    }

    pub(crate) fn behind_background(self) -> bool {
        self.contains(Self::PRIORITY_BEHIND_BACKGROUND)
    }
}

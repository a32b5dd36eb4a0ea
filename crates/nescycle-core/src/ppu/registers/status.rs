use bitflags::bitflags;

bitflags! {
    /// PPUSTATUS (`$2002`).
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V S O . . . . .
    /// ```
    ///
    /// The low five bits are not driven by the PPU; reads return stale bus
    /// contents there.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// Set by a ninth in-range sprite during evaluation.
        const SPRITE_OVERFLOW = 0b0010_0000;
        /// Opaque sprite 0 pixel drawn over an opaque background pixel.
        const SPRITE_ZERO_HIT = 0b0100_0000;
        /// Set at 241:1, cleared at 261:1 and by reading `$2002`.
        const VERTICAL_BLANK = 0b1000_0000;
    }
}

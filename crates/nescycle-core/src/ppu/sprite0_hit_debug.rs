/// Where the first sprite-0 hit of a frame landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sprite0HitPos {
    pub scanline: u16,
    pub dot: u16,
    /// Output pixel column (0..=254).
    pub x: u16,
}

/// Debug record captured on the first sprite-0 hit of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sprite0HitDebug {
    pub pos: Sprite0HitPos,
    /// OAM entry 0 (Y, tile, attributes, X) at the time of the hit.
    pub oam: [u8; 4],
}

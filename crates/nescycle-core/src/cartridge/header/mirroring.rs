use crate::memory::ppu as ppu_mem;

/// Layout mirroring type for the PPU nametables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mirroring {
    /// Two horizontal nametables that mirror vertically (common for NTSC games).
    #[default]
    Horizontal,
    /// Two vertical nametables that mirror horizontally.
    Vertical,
    /// Cartridge supplies its own four nametables.
    FourScreen,
    /// Single-screen mirroring using the first nametable (`$2000` region).
    SingleScreenLower,
    /// Single-screen mirroring using the second nametable (`$2400` region).
    SingleScreenUpper,
}

impl Mirroring {
    /// Physical 1 KiB page backing each of the four logical nametables.
    const fn pages(self) -> [u16; 4] {
        match self {
            Mirroring::Horizontal => [0, 0, 1, 1],
            Mirroring::Vertical => [0, 1, 0, 1],
            Mirroring::FourScreen => [0, 1, 2, 3],
            Mirroring::SingleScreenLower => [0, 0, 0, 0],
            Mirroring::SingleScreenUpper => [1, 1, 1, 1],
        }
    }

    /// Maps a PPU address in `$2000-$3EFF` to an offset into nametable RAM.
    pub fn nametable_offset(self, addr: u16) -> usize {
        let rel = (addr - ppu_mem::NAMETABLE_BASE) & 0x0FFF;
        let table = (rel / ppu_mem::NAMETABLE_SIZE) as usize;
        let page = self.pages()[table];
        (page * ppu_mem::NAMETABLE_SIZE + (rel % ppu_mem::NAMETABLE_SIZE)) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_shares_top_and_bottom_pairs() {
        let m = Mirroring::Horizontal;
        assert_eq!(m.nametable_offset(0x2000), m.nametable_offset(0x2400));
        assert_eq!(m.nametable_offset(0x2800), m.nametable_offset(0x2C00));
        assert_ne!(m.nametable_offset(0x2000), m.nametable_offset(0x2800));
    }

    #[test]
    fn vertical_shares_left_and_right_pairs() {
        let m = Mirroring::Vertical;
        assert_eq!(m.nametable_offset(0x2005), m.nametable_offset(0x2805));
        assert_eq!(m.nametable_offset(0x2405), 0x405);
    }

    #[test]
    fn region_above_2fff_mirrors_down() {
        let m = Mirroring::FourScreen;
        assert_eq!(m.nametable_offset(0x3C10), m.nametable_offset(0x2C10));
        assert_eq!(m.nametable_offset(0x2C10), 0xC10);
        assert_eq!(Mirroring::SingleScreenUpper.nametable_offset(0x2000), 0x400);
    }
}

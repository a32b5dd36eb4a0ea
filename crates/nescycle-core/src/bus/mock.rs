use core::ops::Range;

use crate::{bus::VideoMemory, error::MemError, memory::ppu as ppu_mem};

/// Flat 16 KiB PPU space without mirroring, counting reads.
#[derive(Debug)]
pub(crate) struct FlatVideoMemory {
    pub(crate) bytes: Box<[u8; 0x4000]>,
    pub(crate) reads: usize,
    /// Reads inside this range fail with [`MemError::Unmapped`].
    pub(crate) failing: Option<Range<u16>>,
}

impl Default for FlatVideoMemory {
    fn default() -> Self {
        Self {
            bytes: Box::new([0; 0x4000]),
            reads: 0,
            failing: None,
        }
    }
}

impl VideoMemory for FlatVideoMemory {
    fn get_byte(&mut self, addr: u16) -> Result<u8, MemError> {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        self.reads += 1;
        if self.failing.as_ref().is_some_and(|range| range.contains(&addr)) {
            return Err(MemError::Unmapped { addr });
        }
        Ok(self.bytes[addr as usize])
    }

    fn set_byte(&mut self, addr: u16, value: u8) -> Result<(), MemError> {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        self.bytes[addr as usize] = value;
        Ok(())
    }
}

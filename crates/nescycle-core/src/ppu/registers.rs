//! CPU-visible PPU register state.
//!
//! Covers the `$2000-$2007` set apart from the `v/t/x/w` scroll latches,
//! which live in the pipeline context because the fetch unit mutates them
//! every dot. The bit layouts live in submodules.

mod control;
mod mask;
mod status;
mod vram_addr;
mod vram_registers;

pub use control::Control;
pub use mask::Mask;
pub use status::Status;
pub use vram_addr::VramAddr;
pub(crate) use vram_registers::VramRegisters;

use crate::mem_block::ppu::OamRam;

/// Register block written by the CPU and read back by the pipeline units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Registers {
    pub(crate) control: Control,
    pub(crate) mask: Mask,
    pub(crate) status: Status,
    /// OAM cursor driven by `$2003`/`$2004` and by sprite evaluation.
    pub(crate) oam_addr: u8,
    /// Primary OAM: 64 sprites, 4 bytes each.
    pub(crate) oam: OamRam,
    /// Delayed `$2007` read buffer.
    pub(crate) read_buffer: u8,
    /// Last value driven on the PPU data bus; fills the undriven PPUSTATUS bits.
    pub(crate) io_latch: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub(crate) fn new() -> Self {
        Self {
            control: Control::empty(),
            mask: Mask::empty(),
            status: Status::empty(),
            oam_addr: 0,
            oam: OamRam::new(),
            read_buffer: 0,
            io_latch: 0,
        }
    }

    pub(crate) fn rendering_enabled(&self) -> bool {
        self.mask.rendering_enabled()
    }
}

//! The PPU's 16 KiB address space.
//!
//! The rendering pipeline never touches memory directly. Every nametable,
//! attribute, pattern and palette access goes through [`VideoMemory`], so a
//! host can plug in its own decoder. [`VideoBus`] is the stock implementation:
//!
//! | Range           | Target                                              |
//! |-----------------|-----------------------------------------------------|
//! | `$0000-$1FFF`   | Cartridge CHR ROM/RAM through the mapper            |
//! | `$2000-$3EFF`   | Nametable RAM, mirrored per cartridge mirroring     |
//! | `$3F00-$3FFF`   | 32-byte palette RAM, backdrop entries aliased       |

#[cfg(test)]
pub(crate) mod mock;

use crate::{
    cartridge::{Cartridge, Mirroring},
    error::MemError,
    mem_block::ppu::{NametableRam, PaletteRam},
    memory::ppu as ppu_mem,
};

/// Byte-addressable view of the PPU bus.
pub trait VideoMemory {
    /// Reads one byte; `addr` is wrapped to 14 bits by the implementation.
    fn get_byte(&mut self, addr: u16) -> Result<u8, MemError>;

    /// Writes one byte; `addr` is wrapped to 14 bits by the implementation.
    fn set_byte(&mut self, addr: u16, value: u8) -> Result<(), MemError>;
}

/// Resolves a palette address to an index into the 32-byte palette RAM.
///
/// `$3F10/$3F14/$3F18/$3F1C` alias the background entries below them.
pub fn palette_index(addr: u16) -> usize {
    let mut index = (addr as usize) % ppu_mem::PALETTE_RAM_SIZE;
    if index >= 16 && index % 4 == 0 {
        index -= 16;
    }
    index
}

/// Stock PPU bus: console nametable RAM and palette RAM plus a cartridge slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoBus {
    nametables: NametableRam,
    palette: PaletteRam,
    cartridge: Option<Cartridge>,
    /// Mirroring used when no cartridge is inserted.
    default_mirroring: Mirroring,
}

impl Default for VideoBus {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoBus {
    /// Creates an empty bus with no cartridge inserted.
    pub fn new() -> Self {
        Self {
            nametables: NametableRam::new(),
            palette: PaletteRam::new(),
            cartridge: None,
            default_mirroring: Mirroring::Horizontal,
        }
    }

    /// Creates a bus with `cartridge` already inserted.
    pub fn with_cartridge(cartridge: Cartridge) -> Self {
        let mut bus = Self::new();
        bus.insert_cartridge(cartridge);
        bus
    }

    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    pub fn eject_cartridge(&mut self) -> Option<Cartridge> {
        self.cartridge.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    /// Clears nametable and palette RAM (power cycle).
    pub fn power_on(&mut self) {
        self.nametables.fill(0);
        self.palette.fill(0);
        if let Some(cart) = self.cartridge.as_mut() {
            cart.power_on();
        }
    }

    /// Raw palette RAM, for debug viewers.
    pub fn palette_ram(&self) -> &[u8] {
        &self.palette
    }

    fn mirroring(&self) -> Mirroring {
        self.cartridge
            .as_ref()
            .map_or(self.default_mirroring, Cartridge::mirroring)
    }
}

impl VideoMemory for VideoBus {
    fn get_byte(&mut self, addr: u16) -> Result<u8, MemError> {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0..=ppu_mem::PATTERN_TABLE_END => match self.cartridge.as_ref() {
                Some(cart) => cart.chr_read(addr),
                None => Err(MemError::Unmapped { addr }),
            },
            ppu_mem::NAMETABLE_BASE..=ppu_mem::NAMETABLE_MIRROR_END => {
                Ok(self.nametables[self.mirroring().nametable_offset(addr)])
            }
            _ => Ok(self.palette[palette_index(addr)]),
        }
    }

    fn set_byte(&mut self, addr: u16, value: u8) -> Result<(), MemError> {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0..=ppu_mem::PATTERN_TABLE_END => match self.cartridge.as_mut() {
                Some(cart) => cart.chr_write(addr, value),
                None => Err(MemError::Unmapped { addr }),
            },
            ppu_mem::NAMETABLE_BASE..=ppu_mem::NAMETABLE_MIRROR_END => {
                let offset = self.mirroring().nametable_offset(addr);
                self.nametables[offset] = value;
                Ok(())
            }
            _ => {
                self.palette[palette_index(addr)] = value;
                Ok(())
            }
        }
    }
}

//! Bank mapping for the supported board class.
//!
//! | Mapper | Board | PRG                               | CHR                       |
//! |--------|-------|-----------------------------------|---------------------------|
//! | 0      | NROM  | 16 KiB mirrored or 32 KiB fixed   | 8 KiB fixed               |
//! | 1      | MMC1  | 32 KiB or 16 KiB + fixed 16 KiB   | 8 KiB or two 4 KiB banks  |
//! | 3      | CNROM | same as NROM                      | 8 KiB banked via `$8000+` |
//!
//! The mapper is resolved once at load time; every access afterwards is a
//! `match` on the variant.

use crate::{
    cartridge::header::Mirroring,
    error::CartridgeError,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
};

const CHR_BANK_4K: usize = 4 * 1024;
const CHR_BANK_8K: usize = 8 * 1024;

/// Board-specific banking logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mapper {
    Nrom,
    Mmc1(Mmc1),
    Cnrom(Cnrom),
}

impl Mapper {
    /// Builds the mapper for an iNES mapper number.
    pub fn from_id(id: u16) -> Result<Self, CartridgeError> {
        match id {
            0 => Ok(Mapper::Nrom),
            1 => Ok(Mapper::Mmc1(Mmc1::new())),
            3 => Ok(Mapper::Cnrom(Cnrom::default())),
            other => Err(CartridgeError::UnsupportedMapper(other)),
        }
    }

    /// iNES mapper number.
    pub fn id(&self) -> u16 {
        match self {
            Mapper::Nrom => 0,
            Mapper::Mmc1(_) => 1,
            Mapper::Cnrom(_) => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mapper::Nrom => "NROM",
            Mapper::Mmc1(_) => "MMC1",
            Mapper::Cnrom(_) => "CNROM",
        }
    }

    /// Restores the power-on register state.
    pub fn reset(&mut self) {
        match self {
            Mapper::Nrom => {}
            Mapper::Mmc1(mmc1) => *mmc1 = Mmc1::new(),
            Mapper::Cnrom(cnrom) => *cnrom = Cnrom::default(),
        }
    }

    /// Maps a CPU address in `$8000-$FFFF` to an offset into PRG ROM.
    pub fn map_prg(&self, addr: u16, prg_len: usize) -> Option<usize> {
        if prg_len == 0 || addr < cpu_mem::PRG_ROM_START {
            return None;
        }
        let rel = (addr - cpu_mem::PRG_ROM_START) as usize;
        let offset = match self {
            Mapper::Nrom | Mapper::Cnrom(_) => rel % prg_len,
            Mapper::Mmc1(mmc1) => mmc1.prg_offset(addr, prg_len),
        };
        Some(offset)
    }

    /// Maps a PPU address in `$0000-$1FFF` to an offset into CHR ROM/RAM.
    pub fn map_chr(&self, addr: u16, chr_len: usize) -> Option<usize> {
        if chr_len == 0 || addr > ppu_mem::PATTERN_TABLE_END {
            return None;
        }
        let offset = match self {
            Mapper::Nrom => addr as usize,
            Mapper::Mmc1(mmc1) => mmc1.chr_offset(addr),
            Mapper::Cnrom(cnrom) => cnrom.bank as usize * CHR_BANK_8K + addr as usize,
        };
        Some(offset % chr_len)
    }

    /// Handles a CPU write into the `$8000-$FFFF` register window.
    pub fn write_register(&mut self, addr: u16, value: u8) {
        match self {
            Mapper::Nrom => {}
            Mapper::Mmc1(mmc1) => mmc1.write_register(addr, value),
            Mapper::Cnrom(cnrom) => cnrom.bank = value & 0b11,
        }
    }

    /// Mirroring selected by the mapper, when it overrides the header.
    pub fn mirroring(&self) -> Option<Mirroring> {
        match self {
            Mapper::Mmc1(mmc1) => Some(mmc1.mirroring()),
            Mapper::Nrom | Mapper::Cnrom(_) => None,
        }
    }
}

/// MMC1 (SxROM) serial-port registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mmc1 {
    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,
    shift_reg: u8,
    shift_count: u8,
}

impl Default for Mmc1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmc1 {
    /// Power-on state: 16 KiB PRG banking with the last bank fixed at `$C000`.
    pub fn new() -> Self {
        Self {
            control: 0x0C,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
            shift_reg: 0,
            shift_count: 0,
        }
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        if value & 0x80 != 0 {
            // Reset: clear the shift register and force PRG mode 3.
            self.shift_reg = 0;
            self.shift_count = 0;
            self.control |= 0x0C;
            return;
        }

        self.shift_reg = (self.shift_reg >> 1) | ((value & 1) << 4);
        self.shift_count += 1;
        if self.shift_count < 5 {
            return;
        }

        let data = self.shift_reg & 0x1F;
        match (addr >> 13) & 0b11 {
            0 => self.control = data,
            1 => self.chr_bank0 = data,
            2 => self.chr_bank1 = data,
            _ => self.prg_bank = data,
        }
        self.shift_reg = 0;
        self.shift_count = 0;
    }

    fn prg_offset(&self, addr: u16, prg_len: usize) -> usize {
        let bank_count = (prg_len / cpu_mem::PRG_BANK_16K).max(1);
        let bank = (self.prg_bank & 0x0F) as usize;
        let upper_half = addr >= 0xC000;

        let bank_index = match (self.control >> 2) & 0b11 {
            // 32 KiB mode ignores the low bank bit.
            0 | 1 => (bank & !1) + usize::from(upper_half),
            2 => {
                if upper_half {
                    bank
                } else {
                    0
                }
            }
            _ => {
                if upper_half {
                    bank_count - 1
                } else {
                    bank
                }
            }
        };

        let within = (addr as usize - cpu_mem::PRG_ROM_START as usize) % cpu_mem::PRG_BANK_16K;
        ((bank_index % bank_count) * cpu_mem::PRG_BANK_16K + within) % prg_len
    }

    fn chr_offset(&self, addr: u16) -> usize {
        let within = addr as usize & 0x0FFF;
        let upper_table = addr >= ppu_mem::PATTERN_TABLE_1;
        let bank = if self.control & 0x10 == 0 {
            // 8 KiB mode ignores the low bit of bank 0.
            (self.chr_bank0 & !1) as usize + usize::from(upper_table)
        } else if upper_table {
            self.chr_bank1 as usize
        } else {
            self.chr_bank0 as usize
        };
        bank * CHR_BANK_4K + within
    }

    fn mirroring(&self) -> Mirroring {
        match self.control & 0b11 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }
}

/// CNROM 8 KiB CHR bank select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cnrom {
    bank: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mmc1_serial_write(mapper: &mut Mapper, addr: u16, value: u8) {
        for bit in 0..5 {
            mapper.write_register(addr, (value >> bit) & 1);
        }
    }

    #[test]
    fn nrom_mirrors_16k_prg() {
        let mapper = Mapper::Nrom;
        assert_eq!(mapper.map_prg(0x8000, 0x4000), Some(0));
        assert_eq!(mapper.map_prg(0xC000, 0x4000), Some(0));
        assert_eq!(mapper.map_prg(0xFFFF, 0x8000), Some(0x7FFF));
        assert_eq!(mapper.map_prg(0x6000, 0x8000), None);
    }

    #[test]
    fn cnrom_switches_8k_chr_banks() {
        let mut mapper = Mapper::from_id(3).expect("cnrom");
        mapper.write_register(0x8000, 0x02);
        assert_eq!(mapper.map_chr(0x0010, 4 * CHR_BANK_8K), Some(2 * CHR_BANK_8K + 0x10));
        mapper.write_register(0xFFFF, 0xFD);
        assert_eq!(mapper.map_chr(0x1000, 4 * CHR_BANK_8K), Some(CHR_BANK_8K + 0x1000));
    }

    #[test]
    fn mmc1_serial_port_selects_4k_chr_banks_and_mirroring() {
        let mut mapper = Mapper::from_id(1).expect("mmc1");
        // CHR 4 KiB mode, vertical mirroring.
        mmc1_serial_write(&mut mapper, 0x8000, 0b1_0010);
        mmc1_serial_write(&mut mapper, 0xA000, 3);
        mmc1_serial_write(&mut mapper, 0xC000, 5);
        assert_eq!(mapper.mirroring(), Some(Mirroring::Vertical));
        assert_eq!(mapper.map_chr(0x0004, 32 * CHR_BANK_4K), Some(3 * CHR_BANK_4K + 4));
        assert_eq!(mapper.map_chr(0x1004, 32 * CHR_BANK_4K), Some(5 * CHR_BANK_4K + 4));
    }

    #[test]
    fn mmc1_reset_bit_restores_fixed_last_bank() {
        let mut mapper = Mapper::from_id(1).expect("mmc1");
        mmc1_serial_write(&mut mapper, 0xE000, 2);
        let prg_len = 8 * cpu_mem::PRG_BANK_16K;
        assert_eq!(mapper.map_prg(0x8000, prg_len), Some(2 * cpu_mem::PRG_BANK_16K));
        assert_eq!(mapper.map_prg(0xC000, prg_len), Some(7 * cpu_mem::PRG_BANK_16K));

        // A partial write followed by a reset must not latch anything.
        mapper.write_register(0x8000, 1);
        mapper.write_register(0x8000, 0x80);
        mmc1_serial_write(&mut mapper, 0xE000, 4);
        assert_eq!(mapper.map_prg(0x8000, prg_len), Some(4 * cpu_mem::PRG_BANK_16K));
    }

    #[test]
    fn unsupported_mapper_is_rejected() {
        assert!(matches!(
            Mapper::from_id(4),
            Err(CartridgeError::UnsupportedMapper(4))
        ));
    }
}

//! iNES header parsing.
//!
//! The first 16 bytes of every `.nes` image describe how much PRG/CHR data
//! follows, which mapper the board uses and how the nametables are mirrored.
//! Every field is pulled out with an explicit shift/mask helper over the raw
//! byte slice so the layout never depends on struct packing.

mod mirroring;

pub use mirroring::Mirroring;

use bitflags::bitflags;

use crate::error::CartridgeError;

const NES_MAGIC: &[u8; 4] = b"NES\x1A";

/// Size of the fixed iNES header in bytes.
pub const NES_HEADER_LEN: usize = 16;
/// Size of one PRG ROM unit in the header (16 KiB).
pub const PRG_UNIT: usize = 16 * 1024;
/// Size of one CHR ROM unit in the header (8 KiB).
pub const CHR_UNIT: usize = 8 * 1024;
/// CHR RAM supplied by boards that ship without CHR ROM.
pub const DEFAULT_CHR_RAM_SIZE: usize = 8 * 1024;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags6: u8 {
        const MIRRORING        = 0b0000_0001;
        const BATTERY          = 0b0000_0010;
        const TRAINER          = 0b0000_0100;
        const FOUR_SCREEN      = 0b0000_1000;
        const MAPPER_LOW_MASK  = 0b1111_0000;
    }
}

/// Decoded view of the iNES header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    /// iNES mapper number.
    pub mapper: u16,
    /// Hard-wired nametable mirroring.
    pub mirroring: Mirroring,
    /// Battery-backed PRG RAM present.
    pub battery_backed_ram: bool,
    /// A 512-byte trainer precedes PRG ROM.
    pub trainer_present: bool,
    /// PRG ROM size in bytes.
    pub prg_rom_size: usize,
    /// CHR ROM size in bytes (0 means the board uses CHR RAM).
    pub chr_rom_size: usize,
    /// CHR RAM size in bytes.
    pub chr_ram_size: usize,
}

impl Header {
    /// Parses the 16-byte header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, CartridgeError> {
        if bytes.len() < NES_HEADER_LEN {
            return Err(CartridgeError::TooShort {
                actual: bytes.len(),
            });
        }
        if &bytes[0..4] != NES_MAGIC {
            return Err(CartridgeError::InvalidMagic);
        }

        let flags6 = Flags6::from_bits_retain(bytes[6]);
        let chr_rom_size = chr_rom_size(bytes);

        Ok(Self {
            mapper: mapper_number(bytes),
            mirroring: mirroring(flags6),
            battery_backed_ram: flags6.contains(Flags6::BATTERY),
            trainer_present: flags6.contains(Flags6::TRAINER),
            prg_rom_size: prg_rom_size(bytes),
            chr_rom_size,
            chr_ram_size: if chr_rom_size == 0 {
                DEFAULT_CHR_RAM_SIZE
            } else {
                0
            },
        })
    }

    /// Synthetic header for an NROM board with CHR RAM and no PRG ROM.
    pub fn chr_ram_board(mirroring: Mirroring) -> Self {
        Self {
            mapper: 0,
            mirroring,
            battery_backed_ram: false,
            trainer_present: false,
            prg_rom_size: 0,
            chr_rom_size: 0,
            chr_ram_size: DEFAULT_CHR_RAM_SIZE,
        }
    }
}

fn prg_rom_size(bytes: &[u8]) -> usize {
    bytes[4] as usize * PRG_UNIT
}

fn chr_rom_size(bytes: &[u8]) -> usize {
    bytes[5] as usize * CHR_UNIT
}

/// Mapper number: low nibble from the top of byte 6, high nibble from the top of byte 7.
fn mapper_number(bytes: &[u8]) -> u16 {
    let low = (bytes[6] >> 4) & 0x0F;
    let high = bytes[7] & 0xF0;
    u16::from(high | low)
}

fn mirroring(flags6: Flags6) -> Mirroring {
    if flags6.contains(Flags6::FOUR_SCREEN) {
        Mirroring::FourScreen
    } else if flags6.contains(Flags6::MIRRORING) {
        Mirroring::Vertical
    } else {
        Mirroring::Horizontal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(prg: u8, chr: u8, flags6: u8, flags7: u8) -> [u8; NES_HEADER_LEN] {
        let mut bytes = [0u8; NES_HEADER_LEN];
        bytes[0..4].copy_from_slice(NES_MAGIC);
        bytes[4] = prg;
        bytes[5] = chr;
        bytes[6] = flags6;
        bytes[7] = flags7;
        bytes
    }

    #[test]
    fn parses_sizes_mapper_and_mirroring() {
        let header = Header::parse(&raw(2, 1, 0x11, 0x00)).expect("valid header");
        assert_eq!(header.prg_rom_size, 32 * 1024);
        assert_eq!(header.chr_rom_size, 8 * 1024);
        assert_eq!(header.chr_ram_size, 0);
        assert_eq!(header.mapper, 1);
        assert_eq!(header.mirroring, Mirroring::Vertical);
    }

    #[test]
    fn mapper_high_nibble_comes_from_flags7() {
        let header = Header::parse(&raw(1, 0, 0x30, 0x40)).expect("valid header");
        assert_eq!(header.mapper, 0x43);
        assert_eq!(header.chr_ram_size, DEFAULT_CHR_RAM_SIZE);
        assert_eq!(header.mirroring, Mirroring::Horizontal);
    }

    #[test]
    fn four_screen_bit_wins_over_mirroring_bit() {
        let header = Header::parse(&raw(1, 1, 0b0000_1001, 0)).expect("valid header");
        assert_eq!(header.mirroring, Mirroring::FourScreen);
    }

    #[test]
    fn rejects_bad_magic_and_short_input() {
        let mut bytes = raw(1, 1, 0, 0);
        bytes[3] = 0;
        assert!(matches!(
            Header::parse(&bytes),
            Err(CartridgeError::InvalidMagic)
        ));
        assert!(matches!(
            Header::parse(&bytes[..8]),
            Err(CartridgeError::TooShort { actual: 8 })
        ));
    }
}

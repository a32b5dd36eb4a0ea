use thiserror::Error;

use crate::cartridge::header::NES_HEADER_LEN;

/// Failure reported by a [`VideoMemory`](crate::bus::VideoMemory) access.
///
/// These are data-dependent: the rendering pipeline logs them and substitutes
/// a fallback byte, it never stops mid-frame because of one.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemError {
    /// Nothing is mapped at this address (for example no cartridge inserted).
    #[error("no device mapped at PPU address {addr:#06X}")]
    Unmapped { addr: u16 },
    /// The address is mapped to read-only memory (CHR ROM).
    #[error("PPU address {addr:#06X} is read-only")]
    ReadOnly { addr: u16 },
}

/// Failure while parsing or constructing a cartridge image.
#[derive(Error, Debug)]
pub enum CartridgeError {
    /// Provided buffer is shorter than the 16-byte header.
    #[error("header expected {NES_HEADER_LEN} bytes, got {actual}")]
    TooShort { actual: usize },
    /// Magic number ("NES<EOF>") is missing.
    #[error("missing NES magic bytes")]
    InvalidMagic,
    /// Header advertises a mapper outside the NROM/MMC1/CNROM class.
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u16),
    /// A ROM section (trainer/PRG/CHR) is shorter than advertised.
    #[error("{section} section expected {expected} bytes, got {actual}")]
    SectionTooShort {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The image carries no PRG ROM at all.
    #[error("PRG ROM is empty")]
    EmptyPrg,
}

/// Failure while loading a `.pal` master palette.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteError {
    #[error("palette data must be 192 or 256 bytes, got {0}")]
    InvalidLength(usize),
}

/// Failure while restoring a PPU snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveStateError {
    #[error("corrupt state: {0}")]
    CorruptState(&'static str),
}

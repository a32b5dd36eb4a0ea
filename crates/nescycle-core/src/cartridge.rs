//! Cartridge image and the banking logic the PPU reaches through it.
//!
//! A [`Cartridge`] owns the PRG/CHR data cut out of an iNES image and the
//! [`Mapper`] variant resolved from the header. The PPU only ever sees the CHR
//! side (`chr_read`/`chr_write`) and the current [`Mirroring`]; the CPU side is
//! kept so mapper register writes have somewhere to land.

pub mod header;
mod mapper;

pub use header::{Header, Mirroring};
pub use mapper::{Cnrom, Mapper, Mmc1};

use tracing::debug;

use crate::{
    error::{CartridgeError, MemError},
    memory::cpu as cpu_mem,
};

/// Size of the optional trainer block that precedes PRG ROM.
pub const TRAINER_SIZE: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cartridge {
    header: Header,
    prg_rom: Box<[u8]>,
    prg_ram: Box<[u8]>,
    chr: Box<[u8]>,
    chr_is_ram: bool,
    mapper: Mapper,
}

impl Cartridge {
    /// Parses a complete iNES image (header, optional trainer, PRG, CHR).
    pub fn from_ines(bytes: &[u8]) -> Result<Self, CartridgeError> {
        let header = Header::parse(bytes)?;
        let mut cursor = header::NES_HEADER_LEN;

        let trainer = if header.trainer_present {
            let trainer = take_section(bytes, &mut cursor, TRAINER_SIZE, "trainer")?;
            Some(trainer)
        } else {
            None
        };
        let prg_rom = take_section(bytes, &mut cursor, header.prg_rom_size, "PRG ROM")?;
        if prg_rom.is_empty() {
            return Err(CartridgeError::EmptyPrg);
        }
        let chr_rom = take_section(bytes, &mut cursor, header.chr_rom_size, "CHR ROM")?;

        let mut cartridge = Self::from_parts(header, prg_rom.into(), chr_rom.into())?;
        if let Some(trainer) = trainer {
            // Trainers load at $7000 inside PRG RAM.
            cartridge.prg_ram[0x1000..0x1000 + TRAINER_SIZE].copy_from_slice(trainer);
        }

        debug!(
            mapper = cartridge.mapper.name(),
            prg = header.prg_rom_size,
            chr = header.chr_rom_size,
            mirroring = ?header.mirroring,
            "cartridge loaded"
        );
        Ok(cartridge)
    }

    /// Builds a cartridge from already separated sections.
    ///
    /// An empty `chr` slice allocates `header.chr_ram_size` bytes of CHR RAM.
    pub fn from_parts(
        header: Header,
        prg_rom: Box<[u8]>,
        chr: Box<[u8]>,
    ) -> Result<Self, CartridgeError> {
        let mapper = Mapper::from_id(header.mapper)?;
        let chr_is_ram = chr.is_empty();
        let chr = if chr_is_ram {
            vec![0; header.chr_ram_size.max(header::DEFAULT_CHR_RAM_SIZE)].into_boxed_slice()
        } else {
            chr
        };

        Ok(Self {
            header,
            prg_rom,
            prg_ram: vec![0; cpu_mem::PRG_RAM_SIZE].into_boxed_slice(),
            chr,
            chr_is_ram,
            mapper,
        })
    }

    /// NROM board with 8 KiB of CHR RAM and no program, handy for driving the
    /// PPU directly.
    pub fn with_chr_ram(mirroring: Mirroring) -> Self {
        Self {
            header: Header::chr_ram_board(mirroring),
            prg_rom: Box::default(),
            prg_ram: vec![0; cpu_mem::PRG_RAM_SIZE].into_boxed_slice(),
            chr: vec![0; header::DEFAULT_CHR_RAM_SIZE].into_boxed_slice(),
            chr_is_ram: true,
            mapper: Mapper::Nrom,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Current nametable mirroring (mapper override, else the header's wiring).
    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring().unwrap_or(self.header.mirroring)
    }

    /// Restores mapper registers to their power-on values.
    pub fn power_on(&mut self) {
        self.mapper.reset();
        if self.chr_is_ram {
            self.chr.fill(0);
        }
    }

    /// CPU read from the cartridge window (`$6000-$FFFF`).
    pub fn cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            cpu_mem::PRG_RAM_START..=cpu_mem::PRG_RAM_END => {
                Some(self.prg_ram[(addr - cpu_mem::PRG_RAM_START) as usize])
            }
            cpu_mem::PRG_ROM_START..=0xFFFF => self
                .mapper
                .map_prg(addr, self.prg_rom.len())
                .map(|offset| self.prg_rom[offset]),
            _ => None,
        }
    }

    /// CPU write into the cartridge window; `$8000+` goes to mapper registers.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr {
            cpu_mem::PRG_RAM_START..=cpu_mem::PRG_RAM_END => {
                self.prg_ram[(addr - cpu_mem::PRG_RAM_START) as usize] = value;
            }
            cpu_mem::PRG_ROM_START..=0xFFFF => self.mapper.write_register(addr, value),
            _ => {}
        }
    }

    /// Pattern table read (`$0000-$1FFF`).
    pub fn chr_read(&self, addr: u16) -> Result<u8, MemError> {
        self.mapper
            .map_chr(addr, self.chr.len())
            .map(|offset| self.chr[offset])
            .ok_or(MemError::Unmapped { addr })
    }

    /// Pattern table write; only CHR RAM boards accept it.
    pub fn chr_write(&mut self, addr: u16, value: u8) -> Result<(), MemError> {
        if !self.chr_is_ram {
            return Err(MemError::ReadOnly { addr });
        }
        let offset = self
            .mapper
            .map_chr(addr, self.chr.len())
            .ok_or(MemError::Unmapped { addr })?;
        self.chr[offset] = value;
        Ok(())
    }
}

fn take_section<'a>(
    bytes: &'a [u8],
    cursor: &mut usize,
    len: usize,
    section: &'static str,
) -> Result<&'a [u8], CartridgeError> {
    let available = bytes.len().saturating_sub(*cursor);
    if available < len {
        return Err(CartridgeError::SectionTooShort {
            section,
            expected: len,
            actual: available,
        });
    }
    let slice = &bytes[*cursor..*cursor + len];
    *cursor += len;
    Ok(slice)
}

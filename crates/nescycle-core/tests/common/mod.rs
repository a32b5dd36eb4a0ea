#![allow(dead_code)]

use anyhow::{Result, ensure};
use ctor::ctor;
use nescycle_core::{
    Cartridge, Mirroring, Ppu, VideoBus, VideoMemory, memory::ppu::Register,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Backdrop colour index written to `$3F00` by [`Fixture::new`].
pub const BACKDROP: u8 = 0x0F;

#[ctor]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_file(true)
        .with_line_number(true)
        .with_max_level(Level::DEBUG)
        .pretty()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

/// A PPU wired to a CHR-RAM board, driven only through its CPU registers.
pub struct Fixture {
    pub ppu: Ppu,
    pub bus: VideoBus,
}

impl Fixture {
    pub fn new() -> Self {
        let mut fixture = Self {
            ppu: Ppu::new(),
            bus: VideoBus::with_cartridge(Cartridge::with_chr_ram(Mirroring::Horizontal)),
        };
        fixture.write_vram(0x3F00, &[BACKDROP]);
        // Park v in nametable space so rendering-off frames show the backdrop.
        fixture.write(Register::Addr, 0x20);
        fixture.write(Register::Addr, 0x00);
        fixture
    }

    pub fn write(&mut self, reg: Register, value: u8) {
        self.ppu.cpu_write(reg.addr(), value, &mut self.bus);
    }

    pub fn read(&mut self, reg: Register) -> u8 {
        self.ppu.cpu_read(reg.addr(), &mut self.bus)
    }

    /// Writes `bytes` starting at `addr` through PPUADDR/PPUDATA.
    pub fn write_vram(&mut self, addr: u16, bytes: &[u8]) {
        self.write(Register::Addr, (addr >> 8) as u8);
        self.write(Register::Addr, addr as u8);
        for &byte in bytes {
            self.write(Register::Data, byte);
        }
    }

    /// Uploads one 8x8 tile whose rows all use the given plane bytes.
    pub fn solid_tile(&mut self, table: u16, tile: u8, low: u8, high: u8) {
        let base = table | (u16::from(tile) << 4);
        let mut planes = [low; 16];
        planes[8..].fill(high);
        self.write_vram(base, &planes);
    }

    /// Loads OAM with `sprites` (Y, tile, attributes, X); the rest hide below the screen.
    pub fn load_sprites(&mut self, sprites: &[[u8; 4]]) {
        let mut page = [0xFF; 256];
        for (entry, sprite) in page.chunks_exact_mut(4).zip(sprites) {
            entry.copy_from_slice(sprite);
        }
        self.write(Register::OamAddr, 0);
        self.ppu.oam_dma(&page);
    }

    /// Points `t` at the top-left of nametable 0 with the given X scroll.
    pub fn scroll(&mut self, x: u8, y: u8) {
        let _ = self.read(Register::Status);
        self.write(Register::Control, self.ppu.control().bits() & !0b11);
        self.write(Register::Scroll, x);
        self.write(Register::Scroll, y);
    }

    pub fn run_to(&mut self, scanline: u16, dot: u16) {
        while self.ppu.scanline() != scanline || self.ppu.dot() != dot {
            self.ppu.clock(&mut self.bus);
        }
    }

    pub fn run_frame(&mut self) -> u64 {
        self.ppu.run_until_frame(&mut self.bus)
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.ppu.framebuffer().index_at(x, y)
    }

    pub fn expect_pixel(&self, x: usize, y: usize, expected: u8) -> Result<()> {
        let actual = self.pixel(x, y);
        ensure!(
            actual == expected,
            "pixel ({x}, {y}) expected {expected:#04X}, got {actual:#04X}"
        );
        Ok(())
    }

    pub fn peek(&mut self, addr: u16) -> Result<u8> {
        Ok(self.bus.get_byte(addr)?)
    }
}

//! Dot-accurate NES picture processing unit.
//!
//! [`Ppu`] renders one dot per [`Ppu::clock`] call against any [`VideoMemory`]
//! implementation. [`VideoBus`] wires nametable and palette RAM to a
//! [`Cartridge`] for hosts that do not bring their own PPU bus.

pub mod bus;
pub mod cartridge;
pub mod config;
pub mod error;
pub mod mem_block;
pub mod memory;
pub mod ppu;

pub use bus::{VideoBus, VideoMemory};
pub use cartridge::{Cartridge, Mirroring};
pub use config::PpuConfig;
pub use error::{CartridgeError, MemError, PaletteError, SaveStateError};
pub use ppu::{
    ColorFormat, FrameBuffer, Palette, PaletteKind, Ppu, savestate::PpuState,
};

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

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
}

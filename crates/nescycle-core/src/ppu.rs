//! Dot-accurate Picture Processing Unit.
//!
//! One call to [`Ppu::clock`] advances exactly one dot of the 341 x 262 frame:
//!
//! ```text
//! scanline   0..=239  visible: fetch, evaluate, compose one pixel per dot
//!            240      post-render: idle
//!            241..260 vblank: flag and NMI raised at 241:1
//!            261      pre-render: flags cleared at dot 1, vertical scroll reload
//! ```
//!
//! Within a dot the units run in a fixed order: background fetch, sprite
//! evaluation and sprite fetch update the shared [`PipelineContext`], the
//! compositor samples the shifters, then the background shifters shift and
//! reload. The CPU side reaches the same state through [`Ppu::cpu_read`] and
//! [`Ppu::cpu_write`].
//!
//! [`PipelineContext`]: context::PipelineContext

pub mod buffer;
pub mod palette;
pub mod savestate;

mod background_fetch;
mod background_pipeline;
mod compositor;
mod context;
mod nmi_debug_state;
mod registers;
mod sprite;
mod sprite0_hit_debug;
mod sprite_eval;
mod sprite_fetch;
mod sprite_pipeline;

pub use buffer::{ColorFormat, FrameBuffer};
pub use nmi_debug_state::NmiDebugState;
pub use palette::{Color, Palette, PaletteKind};
pub use registers::{Control, Mask, Status, VramAddr};
pub use sprite::SpriteAttributes;
pub use sprite0_hit_debug::{Sprite0HitDebug, Sprite0HitPos};

use tracing::{debug, error, trace};

use crate::{
    bus::VideoMemory,
    config::PpuConfig,
    memory::ppu::{self as ppu_mem, Register as PpuRegister},
};
use context::PipelineContext;
use registers::Registers;

pub const DOTS_PER_SCANLINE: u16 = 341;
pub const SCANLINES_PER_FRAME: u16 = 262;
pub const VISIBLE_SCANLINES: u16 = 240;
pub const POST_RENDER_SCANLINE: u16 = 240;
pub const VBLANK_START_SCANLINE: u16 = 241;
pub const PRE_RENDER_SCANLINE: u16 = 261;
/// Dots in an even frame, or an odd frame with rendering disabled.
pub const DOTS_PER_FRAME: u64 = DOTS_PER_SCANLINE as u64 * SCANLINES_PER_FRAME as u64;

const LAST_DOT: u16 = DOTS_PER_SCANLINE - 1;
/// Dots where the compositor emits a pixel.
const COMPOSE_DOTS: core::ops::RangeInclusive<u16> = 2..=257;
/// Secondary OAM clear window; OAMDATA reads return `$FF` here.
const SECONDARY_CLEAR_DOTS: core::ops::RangeInclusive<u16> = 1..=64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanlineKind {
    Visible,
    PostRender,
    VBlank,
    PreRender,
}

impl ScanlineKind {
    fn of(scanline: u16) -> Self {
        match scanline {
            0..VISIBLE_SCANLINES => ScanlineKind::Visible,
            POST_RENDER_SCANLINE => ScanlineKind::PostRender,
            PRE_RENDER_SCANLINE => ScanlineKind::PreRender,
            _ => ScanlineKind::VBlank,
        }
    }
}

/// The PPU: CPU-visible registers, the rendering pipeline and its frame.
#[derive(Debug, Clone)]
pub struct Ppu {
    registers: Registers,
    ctx: PipelineContext,
    framebuffer: FrameBuffer,
    palette: Palette,
    config: PpuConfig,
    /// Frames started since power-up (incremented on the 261 -> 0 wrap).
    frame_count: u64,
    /// NMI raised and not yet taken by the host.
    nmi_pending: bool,
    sprite0_hit: Option<Sprite0HitDebug>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self::with_config(PpuConfig::default())
    }

    /// Creates a PPU in its power-up state: pre-render scanline, dot 0.
    pub fn with_config(config: PpuConfig) -> Self {
        Self {
            registers: Registers::new(),
            ctx: PipelineContext::default(),
            framebuffer: FrameBuffer::new(config.color_format),
            palette: config.palette.palette(),
            config,
            frame_count: 0,
            nmi_pending: false,
            sprite0_hit: None,
        }
    }

    /// Returns to the power-up state. The configured palette is kept.
    pub fn reset(&mut self) {
        self.registers = Registers::new();
        self.ctx = PipelineContext::default();
        self.framebuffer.clear();
        self.frame_count = 0;
        self.nmi_pending = false;
        self.sprite0_hit = None;
        debug!("PPU reset");
    }

    pub fn config(&self) -> &PpuConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Replaces the master palette, for example with one loaded from a `.pal` file.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }

    pub fn scanline(&self) -> u16 {
        self.ctx.scanline
    }

    pub fn dot(&self) -> u16 {
        self.ctx.dot
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_odd_frame(&self) -> bool {
        self.ctx.is_odd_frame
    }

    pub fn status(&self) -> Status {
        self.registers.status
    }

    pub fn control(&self) -> Control {
        self.registers.control
    }

    pub fn mask(&self) -> Mask {
        self.registers.mask
    }

    /// Current VRAM address (`v`).
    pub fn vram_addr(&self) -> VramAddr {
        self.ctx.vram.v
    }

    /// Temporary VRAM address (`t`).
    pub fn temp_vram_addr(&self) -> VramAddr {
        self.ctx.vram.t
    }

    pub fn fine_x(&self) -> u8 {
        self.ctx.vram.x
    }

    pub fn oam(&self) -> &[u8] {
        self.registers.oam.as_slice()
    }

    /// Copies a 256-byte page into OAM starting at OAMADDR, the way a `$4014`
    /// transfer does (one OAMDATA write per byte).
    pub fn oam_dma(&mut self, page: &[u8; ppu_mem::OAM_RAM_SIZE]) {
        for &byte in page {
            self.write_oam_data(byte);
        }
    }

    /// First sprite-0 hit of the current frame, if any.
    pub fn sprite0_hit_debug(&self) -> Option<Sprite0HitDebug> {
        self.sprite0_hit
    }

    pub fn nmi_debug_state(&self) -> NmiDebugState {
        NmiDebugState {
            nmi_output: self.registers.control.nmi_enabled(),
            vblank: self.registers.status.contains(Status::VERTICAL_BLANK),
            nmi_pending: self.nmi_pending,
            scanline: self.ctx.scanline,
            dot: self.ctx.dot,
            frame: self.frame_count,
        }
    }

    /// Returns `true` once per raised NMI.
    pub fn take_nmi(&mut self) -> bool {
        core::mem::take(&mut self.nmi_pending)
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Advances the PPU by one dot.
    pub fn clock(&mut self, mem: &mut impl VideoMemory) {
        // Odd frames skip dot 0 of scanline 0 while rendering.
        if self.ctx.scanline == 0
            && self.ctx.dot == 0
            && self.ctx.is_odd_frame
            && self.registers.rendering_enabled()
        {
            trace!(frame = self.frame_count, "odd frame dot skipped");
            self.ctx.dot = 1;
        }

        match ScanlineKind::of(self.ctx.scanline) {
            ScanlineKind::Visible => self.visible_dot(mem),
            ScanlineKind::PostRender => {}
            ScanlineKind::VBlank => {
                if self.ctx.scanline == VBLANK_START_SCANLINE && self.ctx.dot == 1 {
                    self.registers.status.insert(Status::VERTICAL_BLANK);
                    trace!(frame = self.frame_count, "vblank start");
                    self.check_gen_nmi();
                }
            }
            ScanlineKind::PreRender => self.pre_render_dot(mem),
        }

        self.advance_position();
    }

    /// Clocks until the frame in progress is complete and returns the number
    /// of dots run. A stale ready flag is discarded first; the new one is left
    /// set for the consumer.
    pub fn run_until_frame(&mut self, mem: &mut impl VideoMemory) -> u64 {
        self.framebuffer.take_frame_ready();
        let mut dots = 0;
        while !self.framebuffer.is_dirty() {
            self.clock(mem);
            dots += 1;
        }
        dots
    }

    /// CPU read from `$2000-$3FFF` (mirrored every 8 bytes).
    pub fn cpu_read(&mut self, addr: u16, mem: &mut impl VideoMemory) -> u8 {
        let value = match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Status => self.read_status(),
            PpuRegister::OamData => self.read_oam_data(),
            PpuRegister::Data => self.read_data(mem),
            // Write-only registers return whatever is left on the data bus.
            _ => self.registers.io_latch,
        };
        self.registers.io_latch = value;
        value
    }

    /// CPU write to `$2000-$3FFF` (mirrored every 8 bytes).
    pub fn cpu_write(&mut self, addr: u16, value: u8, mem: &mut impl VideoMemory) {
        self.registers.io_latch = value;
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Control => self.write_control(value),
            PpuRegister::Mask => self.registers.mask = Mask::from_bits_retain(value),
            PpuRegister::Status => {}
            PpuRegister::OamAddr => self.registers.oam_addr = value,
            PpuRegister::OamData => self.write_oam_data(value),
            PpuRegister::Scroll => self.ctx.vram.write_scroll(value),
            PpuRegister::Addr => self.ctx.vram.write_addr(value),
            PpuRegister::Data => self.write_data(value, mem),
        }
    }

    /// Raises NMI when VBlank is set and PPUCTRL enables it.
    fn check_gen_nmi(&mut self) {
        if self.registers.control.nmi_enabled()
            && self.registers.status.contains(Status::VERTICAL_BLANK)
        {
            self.nmi_pending = true;
            trace!(
                scanline = self.ctx.scanline,
                dot = self.ctx.dot,
                "NMI raised"
            );
        }
    }

    fn visible_dot(&mut self, mem: &mut impl VideoMemory) {
        let rendering = self.registers.rendering_enabled();
        if rendering {
            background_fetch::tick(&mut self.ctx, &self.registers, mem, &self.config);
            sprite_eval::tick(&mut self.ctx, &mut self.registers);
            sprite_fetch::tick(&mut self.ctx, &mut self.registers, mem, &self.config);
        }
        sprite_fetch::check_window(&mut self.ctx, rendering);

        if COMPOSE_DOTS.contains(&self.ctx.dot) {
            let scanline = self.ctx.scanline;
            let dot = self.ctx.dot;
            let out = compositor::tick(
                &mut self.ctx,
                &mut self.registers,
                mem,
                &self.config,
                &self.palette,
                &mut self.framebuffer,
            );
            if out.sprite0_hit {
                self.record_sprite0_hit(scanline, dot, out.col);
            }
        }

        if rendering {
            background_fetch::shift_and_reload(&mut self.ctx);
        }
    }

    fn pre_render_dot(&mut self, mem: &mut impl VideoMemory) {
        if self.ctx.dot == 1 {
            self.registers.status.remove(
                Status::VERTICAL_BLANK | Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW,
            );
            // No evaluation runs on this line, so scanline 0 has no sprites.
            self.ctx.eval.sp_got = 0;
            self.ctx.eval.with_sp0_next = false;
            self.sprite0_hit = None;
        }

        let rendering = self.registers.rendering_enabled();
        if rendering {
            background_fetch::tick(&mut self.ctx, &self.registers, mem, &self.config);
            sprite_fetch::tick(&mut self.ctx, &mut self.registers, mem, &self.config);
        }
        sprite_fetch::check_window(&mut self.ctx, rendering);
        if rendering {
            background_fetch::shift_and_reload(&mut self.ctx);
        }
    }

    fn advance_position(&mut self) {
        self.ctx.dot += 1;
        if self.ctx.dot < DOTS_PER_SCANLINE {
            return;
        }
        self.ctx.dot = 0;
        self.ctx.scanline += 1;
        if self.ctx.scanline == SCANLINES_PER_FRAME {
            self.ctx.scanline = 0;
            self.ctx.is_odd_frame = !self.ctx.is_odd_frame;
            self.frame_count += 1;
            trace!(frame = self.frame_count, odd = self.ctx.is_odd_frame, "frame start");
        }
    }

    fn record_sprite0_hit(&mut self, scanline: u16, dot: u16, col: u16) {
        if self.sprite0_hit.is_some() {
            return;
        }
        let mut oam = [0; 4];
        oam.copy_from_slice(&self.registers.oam[..4]);
        self.sprite0_hit = Some(Sprite0HitDebug {
            pos: Sprite0HitPos {
                scanline,
                dot,
                x: col,
            },
            oam,
        });
        debug!(scanline, dot, x = col, "sprite 0 hit");
    }

    /// Rendering is active on visible and pre-render lines with either layer on.
    fn rendering_active(&self) -> bool {
        self.registers.rendering_enabled()
            && matches!(
                ScanlineKind::of(self.ctx.scanline),
                ScanlineKind::Visible | ScanlineKind::PreRender
            )
    }

    fn write_control(&mut self, value: u8) {
        let was_enabled = self.registers.control.nmi_enabled();
        self.registers.control = Control::from_bits_retain(value);
        self.ctx
            .vram
            .t
            .set_nametable(self.registers.control.nametable_index());
        if !was_enabled {
            self.check_gen_nmi();
        }
    }

    fn read_status(&mut self) -> u8 {
        let value = (self.registers.status.bits() & 0xE0) | (self.registers.io_latch & 0x1F);
        self.registers.status.remove(Status::VERTICAL_BLANK);
        self.ctx.vram.reset_latch();
        value
    }

    fn read_oam_data(&self) -> u8 {
        if self.ctx.scanline < VISIBLE_SCANLINES
            && self.registers.rendering_enabled()
            && SECONDARY_CLEAR_DOTS.contains(&self.ctx.dot)
        {
            return 0xFF;
        }
        self.registers.oam[self.registers.oam_addr as usize]
    }

    fn write_oam_data(&mut self, value: u8) {
        if self.rendering_active() {
            // Writes are dropped; the address still bumps by a whole sprite.
            self.registers.oam_addr = self.registers.oam_addr.wrapping_add(4);
            return;
        }
        self.registers.oam[self.registers.oam_addr as usize] = value;
        self.registers.oam_addr = self.registers.oam_addr.wrapping_add(1);
    }

    fn read_data(&mut self, mem: &mut impl VideoMemory) -> u8 {
        let addr = self.ctx.vram.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
        let value = if addr >= ppu_mem::PALETTE_BASE {
            // Palette reads are immediate; the buffer takes the nametable
            // byte underneath.
            let value = fetch_byte(mem, addr, self.config.palette_fallback);
            self.registers.read_buffer =
                fetch_byte(mem, addr - 0x1000, self.config.pattern_fallback);
            value
        } else {
            let buffered = self.registers.read_buffer;
            self.registers.read_buffer = fetch_byte(mem, addr, self.config.pattern_fallback);
            buffered
        };
        self.increment_after_data_access();
        value
    }

    fn write_data(&mut self, value: u8, mem: &mut impl VideoMemory) {
        let addr = self.ctx.vram.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
        if let Err(err) = mem.set_byte(addr, value) {
            debug!(addr = format_args!("{addr:#06X}"), %err, "PPUDATA write dropped");
        }
        self.increment_after_data_access();
    }

    /// During rendering a PPUDATA access bumps coarse X and Y together
    /// instead of the linear increment.
    fn increment_after_data_access(&mut self) {
        if self.rendering_active() {
            self.ctx.vram.v.increment_coarse_x();
            self.ctx.vram.v.increment_y();
        } else {
            let step = self.registers.control.vram_increment();
            self.ctx.vram.v.increment(step);
        }
    }
}

/// Reads one byte from the PPU bus, logging failures and substituting `fallback`.
fn fetch_byte(mem: &mut impl VideoMemory, addr: u16, fallback: u8) -> u8 {
    mem.get_byte(addr).unwrap_or_else(|err| {
        error!(
            addr = format_args!("{addr:#06X}"),
            %err,
            fallback,
            "PPU bus read failed"
        );
        fallback
    })
}

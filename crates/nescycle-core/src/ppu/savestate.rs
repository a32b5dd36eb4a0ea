//! Plain-data snapshot of the PPU.
//!
//! The snapshot structs are always available; the `savestate-serde` feature
//! derives serde for them and `savestate-postcard` adds a byte encoding.

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use super::{
    Ppu,
    context::BgLatches,
    registers::{Control, Mask, Status, VramAddr},
    sprite::SPRITES_PER_LINE,
    sprite_eval::SpriteEval,
    sprite_fetch::SpriteFetch,
};
use crate::{
    error::SaveStateError,
    mem_block::ppu::{OamRam, SecondaryOamRam},
    memory::ppu as ppu_mem,
};

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BgShifterState {
    pub pattern: [u16; 2],
    pub palette: [u16; 2],
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteSlotState {
    pub pattern_low: u8,
    pub pattern_high: u8,
    pub attributes: u8,
    pub x_counter: u16,
    pub active: u8,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteEvalState {
    pub n: u8,
    pub m: u8,
    pub n_overflow: bool,
    pub sp_overflow: bool,
    pub sp_got: u8,
    pub cp_counter: u8,
    pub latch: u8,
    pub init_oam_addr: u8,
    pub write_idx: u8,
    pub with_sp0_next: bool,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteFetchState {
    pub read_idx: u8,
    pub y: u8,
    pub tile: u8,
    pub attr: u8,
    pub x: u8,
    pub pattern_low: u8,
    pub armed: bool,
}

/// Full PPU snapshot. The frame buffer is not included; it is rebuilt by the
/// next frame.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PpuState {
    pub control: u8,
    pub mask: u8,
    pub status: u8,
    pub oam_addr: u8,
    pub oam: OamRam,
    pub read_buffer: u8,
    pub io_latch: u8,

    pub scanline: u16,
    pub dot: u16,
    pub pixel_row: u16,
    pub pixel_col: u16,
    pub v: u16,
    pub t: u16,
    pub x: u8,
    pub w: bool,

    /// `[nametable, attribute palette, lower sliver, upper sliver]`.
    pub bg_latches: [u8; 4],
    pub bg_shifters: BgShifterState,
    pub secondary_oam: SecondaryOamRam,
    pub eval: SpriteEvalState,
    pub fetch: SpriteFetchState,
    pub sprite_slots: [SpriteSlotState; SPRITES_PER_LINE],
    pub with_sp0: bool,
    pub is_odd_frame: bool,

    pub frame_count: u64,
    pub nmi_pending: bool,
}

#[cfg(feature = "savestate-postcard")]
impl PpuState {
    pub fn to_postcard_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_stdvec(self)
    }

    pub fn from_postcard_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

impl Ppu {
    /// Captures the complete pipeline state.
    pub fn save_state(&self) -> PpuState {
        let regs = &self.registers;
        let ctx = &self.ctx;
        let eval = ctx.eval;
        let fetch = ctx.fetch;
        PpuState {
            control: regs.control.bits(),
            mask: regs.mask.bits(),
            status: regs.status.bits(),
            oam_addr: regs.oam_addr,
            oam: regs.oam.clone(),
            read_buffer: regs.read_buffer,
            io_latch: regs.io_latch,
            scanline: ctx.scanline,
            dot: ctx.dot,
            pixel_row: ctx.pixel_row,
            pixel_col: ctx.pixel_col,
            v: ctx.vram.v.raw(),
            t: ctx.vram.t.raw(),
            x: ctx.vram.x,
            w: ctx.vram.w,
            bg_latches: [
                ctx.bg.nt_byte,
                ctx.bg.attr_palette_idx,
                ctx.bg.lower_sliver,
                ctx.bg.upper_sliver,
            ],
            bg_shifters: ctx.bg_shifters.save_state(),
            secondary_oam: ctx.sec_oam.clone(),
            eval: SpriteEvalState {
                n: eval.n,
                m: eval.m,
                n_overflow: eval.n_overflow,
                sp_overflow: eval.sp_overflow,
                sp_got: eval.sp_got,
                cp_counter: eval.cp_counter,
                latch: eval.latch,
                init_oam_addr: eval.init_oam_addr,
                write_idx: eval.write_idx,
                with_sp0_next: eval.with_sp0_next,
            },
            fetch: SpriteFetchState {
                read_idx: fetch.read_idx,
                y: fetch.y,
                tile: fetch.tile,
                attr: fetch.attr,
                x: fetch.x,
                pattern_low: fetch.pattern_low,
                armed: fetch.armed,
            },
            sprite_slots: ctx.sprites.save_state(),
            with_sp0: ctx.with_sp0,
            is_odd_frame: ctx.is_odd_frame,
            frame_count: self.frame_count,
            nmi_pending: self.nmi_pending,
        }
    }

    /// Restores a snapshot taken by [`Ppu::save_state`].
    pub fn load_state(&mut self, state: &PpuState) -> Result<(), SaveStateError> {
        if state.scanline > super::PRE_RENDER_SCANLINE || state.dot > super::LAST_DOT {
            return Err(SaveStateError::CorruptState("timing position"));
        }
        if state.pixel_row as usize >= super::FrameBuffer::HEIGHT
            || state.pixel_col as usize >= super::FrameBuffer::WIDTH
        {
            return Err(SaveStateError::CorruptState("pixel position"));
        }

        let regs = &mut self.registers;
        regs.control = Control::from_bits_retain(state.control);
        regs.mask = Mask::from_bits_retain(state.mask);
        regs.status = Status::from_bits_truncate(state.status);
        regs.oam_addr = state.oam_addr;
        regs.oam.copy_from_slice(&state.oam);
        regs.read_buffer = state.read_buffer;
        regs.io_latch = state.io_latch;

        let ctx = &mut self.ctx;
        ctx.scanline = state.scanline;
        ctx.dot = state.dot;
        ctx.pixel_row = state.pixel_row;
        ctx.pixel_col = state.pixel_col;
        ctx.vram.v = VramAddr::new(state.v);
        ctx.vram.t = VramAddr::new(state.t);
        ctx.vram.x = state.x & 0b111;
        ctx.vram.w = state.w;
        let [nt_byte, attr_palette_idx, lower_sliver, upper_sliver] = state.bg_latches;
        ctx.bg = BgLatches {
            nt_byte,
            attr_palette_idx: attr_palette_idx & 0b11,
            lower_sliver,
            upper_sliver,
        };
        ctx.bg_shifters.load_state(&state.bg_shifters);
        ctx.sec_oam.copy_from_slice(&state.secondary_oam);
        let eval = state.eval;
        ctx.eval = SpriteEval {
            n: eval.n & 0x3F,
            m: eval.m & 0b11,
            n_overflow: eval.n_overflow,
            sp_overflow: eval.sp_overflow,
            sp_got: eval.sp_got.min(SPRITES_PER_LINE as u8),
            cp_counter: eval.cp_counter.min(3),
            latch: eval.latch,
            init_oam_addr: eval.init_oam_addr,
            write_idx: eval.write_idx.min(ppu_mem::SECONDARY_OAM_RAM_SIZE as u8),
            with_sp0_next: eval.with_sp0_next,
        };
        let fetch = state.fetch;
        ctx.fetch = SpriteFetch {
            read_idx: fetch.read_idx.min(ppu_mem::SECONDARY_OAM_RAM_SIZE as u8),
            y: fetch.y,
            tile: fetch.tile,
            attr: fetch.attr,
            x: fetch.x,
            pattern_low: fetch.pattern_low,
            armed: fetch.armed,
        };
        ctx.sprites.load_state(&state.sprite_slots);
        ctx.with_sp0 = state.with_sp0;
        ctx.is_odd_frame = state.is_odd_frame;

        self.frame_count = state.frame_count;
        self.nmi_pending = state.nmi_pending;
        self.sprite0_hit = None;
        Ok(())
    }
}

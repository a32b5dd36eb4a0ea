//! Sprite slot reload (dots 257-320).
//!
//! Eight 8-dot blocks, one per slot. Offsets 0-3 read Y, tile, attributes
//! and X from secondary OAM; offsets 5 and 7 fetch the two pattern slivers.
//! Slots past the number of sprites found are loaded transparent without
//! touching the bus.

use tracing::error;

use super::{
    PpuConfig, Registers, fetch_byte,
    context::PipelineContext,
    sprite::SpriteAttributes,
    sprite_pipeline::SpriteSlot,
};
use crate::{bus::VideoMemory, memory::ppu as ppu_mem};

pub(crate) const FETCH_START: u16 = 257;
pub(crate) const FETCH_END: u16 = 320;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpriteFetch {
    /// Secondary OAM read cursor (0..=32).
    pub(crate) read_idx: u8,
    pub(crate) y: u8,
    pub(crate) tile: u8,
    pub(crate) attr: u8,
    pub(crate) x: u8,
    pub(crate) pattern_low: u8,
    /// Rendering stayed enabled for the whole window so far.
    pub(crate) armed: bool,
}

pub(crate) fn tick(
    ctx: &mut PipelineContext,
    regs: &mut Registers,
    mem: &mut impl VideoMemory,
    config: &PpuConfig,
) {
    let dot = ctx.dot;
    if !(FETCH_START..=FETCH_END).contains(&dot) {
        return;
    }
    regs.oam_addr = 0;

    let rel = dot - FETCH_START;
    let slot = (rel / 8) as usize;
    if rel == 0 {
        ctx.fetch.read_idx = 0;
    }
    match rel % 8 {
        0 => ctx.fetch.y = read_secondary(ctx),
        1 => ctx.fetch.tile = read_secondary(ctx),
        2 => {
            ctx.fetch.attr = read_secondary(ctx);
            if slot == 0 {
                ctx.with_sp0 = ctx.eval.with_sp0_next;
            }
        }
        3 => ctx.fetch.x = read_secondary(ctx),
        5 => ctx.fetch.pattern_low = fetch_sliver(ctx, regs, mem, config, slot, false),
        7 => {
            let pattern_high = fetch_sliver(ctx, regs, mem, config, slot, true);
            let attributes = SpriteAttributes::from_bits_retain(ctx.fetch.attr);
            let (low, high) = if attributes.contains(SpriteAttributes::FLIP_HORIZONTAL) {
                (ctx.fetch.pattern_low.reverse_bits(), pattern_high.reverse_bits())
            } else {
                (ctx.fetch.pattern_low, pattern_high)
            };
            ctx.sprites.load(
                slot,
                SpriteSlot {
                    pattern_low: low,
                    pattern_high: high,
                    attributes,
                    x_counter: u16::from(ctx.fetch.x) + 1,
                    active: 0,
                },
            );
        }
        _ => {}
    }
}

/// Tracks whether rendering stayed on for the window and checks the read
/// cursor at its end. Called every dot of a rendering scanline.
pub(crate) fn check_window(ctx: &mut PipelineContext, rendering: bool) {
    match ctx.dot {
        FETCH_START => ctx.fetch.armed = rendering,
        d if d > FETCH_START && d <= FETCH_END => {
            ctx.fetch.armed &= rendering;
            if d == FETCH_END && ctx.fetch.armed && ctx.fetch.read_idx != 32 {
                error!(
                    scanline = ctx.scanline,
                    read_idx = ctx.fetch.read_idx,
                    "secondary OAM read cursor out of step"
                );
                debug_assert_eq!(ctx.fetch.read_idx, 32);
            }
        }
        _ => {}
    }
}

fn read_secondary(ctx: &mut PipelineContext) -> u8 {
    let idx = ctx.fetch.read_idx as usize % ppu_mem::SECONDARY_OAM_RAM_SIZE;
    ctx.fetch.read_idx = ctx.fetch.read_idx.saturating_add(1);
    ctx.sec_oam[idx]
}

fn fetch_sliver(
    ctx: &PipelineContext,
    regs: &Registers,
    mem: &mut impl VideoMemory,
    config: &PpuConfig,
    slot: usize,
    upper: bool,
) -> u8 {
    if slot >= ctx.eval.sp_got as usize {
        return 0x00;
    }
    let addr = sprite_pattern_addr(ctx, regs, upper);
    fetch_byte(mem, addr, config.pattern_fallback)
}

fn sprite_pattern_addr(ctx: &PipelineContext, regs: &Registers, upper: bool) -> u16 {
    let height = regs.control.sprite_height() as u16;
    let attributes = SpriteAttributes::from_bits_retain(ctx.fetch.attr);
    let mut row = ctx.scanline.wrapping_sub(u16::from(ctx.fetch.y)) & (height - 1);
    if attributes.contains(SpriteAttributes::FLIP_VERTICAL) {
        row = height - 1 - row;
    }

    let (table, tile) = if height == 16 {
        let table = if ctx.fetch.tile & 1 != 0 {
            ppu_mem::PATTERN_TABLE_1
        } else {
            ppu_mem::PATTERN_TABLE_0
        };
        (table, (ctx.fetch.tile & 0xFE) + u8::from(row >= 8))
    } else {
        (regs.control.sprite_pattern_table(), ctx.fetch.tile)
    };

    table | (u16::from(tile) << 4) | (row & 0b111) | if upper { 8 } else { 0 }
}

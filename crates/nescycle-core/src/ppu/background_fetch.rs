//! Background tile fetches and scroll counter updates.
//!
//! Each tile takes eight dots. Fetches land on the odd dots of the block and
//! the coarse X increment on its last dot:
//!
//! ```text
//! offset  1    3     5        7         8
//!         NT   AT    pattern  pattern   inc X
//!                    low      high
//! ```
//!
//! Blocks start at dots 1, 9, .., 249 (tiles for the current line) and 321,
//! 329 (first two tiles of the next line). Dots 337 and 339 fetch the
//! nametable byte twice more; nothing uses it.

use super::{PpuConfig, Registers, context::PipelineContext, fetch_byte};
use crate::bus::VideoMemory;

const VERTICAL_COPY: core::ops::RangeInclusive<u16> = 280..=304;

/// Step of the 8-dot tile fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum FetchStep {
    Nametable,
    Attribute,
    PatternLow,
    PatternHigh,
    IncrementX,
    Idle,
}

impl FetchStep {
    /// Step performed at `dot`, for dots inside the fetch windows.
    pub(crate) fn at(dot: u16) -> Self {
        match dot {
            1..=256 | 321..=336 => match (dot - 1) % 8 + 1 {
                1 => FetchStep::Nametable,
                3 => FetchStep::Attribute,
                5 => FetchStep::PatternLow,
                7 => FetchStep::PatternHigh,
                8 => FetchStep::IncrementX,
                _ => FetchStep::Idle,
            },
            337 | 339 => FetchStep::Nametable,
            _ => FetchStep::Idle,
        }
    }
}

/// Tile fetches plus the `v` updates for one dot of a rendering scanline.
pub(crate) fn tick(
    ctx: &mut PipelineContext,
    regs: &Registers,
    mem: &mut impl VideoMemory,
    config: &PpuConfig,
) {
    let dot = ctx.dot;
    let v = ctx.vram.v;

    match FetchStep::at(dot) {
        FetchStep::Nametable => {
            ctx.bg.nt_byte = fetch_byte(mem, v.tile_addr(), config.pattern_fallback);
        }
        FetchStep::Attribute => {
            let attr = fetch_byte(mem, v.attribute_addr(), config.pattern_fallback);
            ctx.bg.attr_palette_idx = (attr >> v.attribute_shift()) & 0b11;
        }
        FetchStep::PatternLow => {
            let addr = pattern_addr(ctx, regs, false);
            ctx.bg.lower_sliver = fetch_byte(mem, addr, config.pattern_fallback);
        }
        FetchStep::PatternHigh => {
            let addr = pattern_addr(ctx, regs, true);
            ctx.bg.upper_sliver = fetch_byte(mem, addr, config.pattern_fallback);
        }
        FetchStep::IncrementX => ctx.vram.v.increment_coarse_x(),
        FetchStep::Idle => {}
    }

    if dot == 256 {
        ctx.vram.v.increment_y();
    } else if dot == 257 {
        let t = ctx.vram.t;
        ctx.vram.v.copy_horizontal(t);
    } else if ctx.scanline == super::PRE_RENDER_SCANLINE && VERTICAL_COPY.contains(&dot) {
        let t = ctx.vram.t;
        ctx.vram.v.copy_vertical(t);
    }
}

/// Shifts the background shifters, then reloads them on tile boundaries.
pub(crate) fn shift_and_reload(ctx: &mut PipelineContext) {
    let dot = ctx.dot;
    if matches!(dot, 2..=257 | 322..=337) {
        ctx.bg_shifters.shift();
    }
    let reload = match dot {
        1..=257 => dot % 8 == 1,
        329 | 337 => true,
        _ => false,
    };
    if reload {
        let bg = ctx.bg;
        ctx.bg_shifters
            .reload(bg.lower_sliver, bg.upper_sliver, bg.attr_palette_idx);
    }
}

/// `fine_y | upper << 3 | tile << 4 | table << 12`.
fn pattern_addr(ctx: &PipelineContext, regs: &Registers, upper: bool) -> u16 {
    let plane = if upper { 8 } else { 0 };
    regs.control.background_pattern_table()
        | (u16::from(ctx.bg.nt_byte) << 4)
        | plane
        | u16::from(ctx.vram.v.fine_y())
}

//! Pixel multiplexer (dots 2-257 of visible scanlines).
//!
//! Picks between the background and sprite pixel, resolves the palette RAM
//! address and writes one pixel per dot into the frame buffer.

use tracing::error;

use super::{
    PpuConfig, Registers, Status,
    buffer::FrameBuffer,
    context::PipelineContext,
    fetch_byte,
    palette::Palette,
    sprite_pipeline::SpritePixel,
};
use crate::{bus::VideoMemory, memory::ppu as ppu_mem};

/// Outcome of one compositor dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct DotOutput {
    /// Column of the pixel just written.
    pub(crate) col: u16,
    /// Sprite 0 hit was raised on this dot (first time this frame).
    pub(crate) sprite0_hit: bool,
}

pub(crate) fn tick(
    ctx: &mut PipelineContext,
    regs: &mut Registers,
    mem: &mut impl VideoMemory,
    config: &PpuConfig,
    palette: &Palette,
    frame: &mut FrameBuffer,
) -> DotOutput {
    let row = ctx.pixel_row;
    let col = ctx.pixel_col;
    let mut out = DotOutput {
        col,
        sprite0_hit: false,
    };
    if row as usize >= FrameBuffer::HEIGHT || col as usize >= FrameBuffer::WIDTH {
        error!(row, col, "pixel position outside the frame");
        debug_assert!(false, "pixel position ({col}, {row}) outside the frame");
        return out;
    }

    let addr = if regs.rendering_enabled() {
        let mask = regs.mask;
        let (bg_palette, bg_pattern) = if mask.background_visible_at(col) {
            ctx.bg_shifters.sample(ctx.vram.x)
        } else {
            (0, 0)
        };
        let mut sprite = ctx.sprites.step(ctx.with_sp0);
        if !mask.sprites_visible_at(col) {
            sprite = SpritePixel::default();
        }

        if sprite.is_sprite0
            && sprite.is_opaque()
            && bg_pattern != 0
            && col != 255
            && !regs.status.contains(Status::SPRITE_ZERO_HIT)
        {
            regs.status.insert(Status::SPRITE_ZERO_HIT);
            out.sprite0_hit = true;
        }

        palette_addr(bg_palette, bg_pattern, sprite)
    } else {
        // With rendering off the backdrop follows `v` when it points at palette RAM.
        let v = ctx.vram.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
        if v >= ppu_mem::PALETTE_BASE {
            v
        } else {
            ppu_mem::PALETTE_BASE
        }
    };

    let index = fetch_byte(mem, addr, config.palette_fallback) & regs.mask.color_mask();
    frame.write_pixel(col as usize, row as usize, index, palette.to_rgb(index));
    advance_pixel(ctx, frame);
    out
}

/// Background wins when the sprite is transparent, or when both are opaque
/// and the sprite sits behind the background.
fn palette_addr(bg_palette: u8, bg_pattern: u8, sprite: SpritePixel) -> u16 {
    let bg_opaque = bg_pattern != 0;
    if sprite.is_opaque() && !(bg_opaque && sprite.behind_background) {
        ppu_mem::SPRITE_PALETTE_BASE | (u16::from(sprite.palette) << 2) | u16::from(sprite.pattern)
    } else if bg_opaque {
        ppu_mem::PALETTE_BASE | (u16::from(bg_palette) << 2) | u16::from(bg_pattern)
    } else {
        ppu_mem::PALETTE_BASE
    }
}

fn advance_pixel(ctx: &mut PipelineContext, frame: &mut FrameBuffer) {
    ctx.pixel_col += 1;
    if ctx.pixel_col as usize == FrameBuffer::WIDTH {
        ctx.pixel_col = 0;
        ctx.pixel_row += 1;
        if ctx.pixel_row as usize == FrameBuffer::HEIGHT {
            ctx.pixel_row = 0;
            frame.mark_frame_complete();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(pattern: u8, behind: bool) -> SpritePixel {
        SpritePixel {
            palette: 2,
            pattern,
            behind_background: behind,
            is_sprite0: false,
        }
    }

    #[test]
    fn priority_rules() {
        // Transparent sprite: background shows.
        assert_eq!(palette_addr(1, 3, sprite(0, false)), 0x3F07);
        // Opaque front sprite over opaque background.
        assert_eq!(palette_addr(1, 3, sprite(1, false)), 0x3F19);
        // Behind-background sprite loses to opaque background...
        assert_eq!(palette_addr(1, 3, sprite(1, true)), 0x3F07);
        // ...but wins over a transparent one.
        assert_eq!(palette_addr(1, 0, sprite(1, true)), 0x3F19);
        // Both transparent: universal backdrop regardless of palette bits.
        assert_eq!(palette_addr(3, 0, sprite(0, false)), 0x3F00);
    }
}

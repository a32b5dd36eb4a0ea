//! Secondary OAM selection (dots 1-256 of visible scanlines).
//!
//! ```text
//! dots   1..=64   clear secondary OAM to $FF (odd: dummy read, even: write)
//! dot    65       latch OAMADDR as the walk origin, reset counters
//! dots   65..=256 odd: read OAM[(origin + 4n + m) & $FF]; even: act on it
//! ```
//!
//! Once eight sprites are found the write side turns into reads and the
//! hardware's broken `n`/`m` walk takes over: a missed Y test increments both
//! `n` and `m` (without carry), so later sprites are tested against their
//! tile, attribute or X byte. A hit there raises the overflow flag.

use tracing::trace;

use super::{
    Registers, Status,
    context::PipelineContext,
    sprite::{OAM_ENTRY_SIZE, SPRITES_PER_LINE},
};
use crate::memory::ppu as ppu_mem;

const SPRITE_COUNT: u8 = (ppu_mem::OAM_RAM_SIZE / OAM_ENTRY_SIZE) as u8;

/// Evaluation counters for the scanline in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpriteEval {
    /// Sprite index in primary OAM (0..=63).
    pub(crate) n: u8,
    /// Byte within the sprite (0..=3).
    pub(crate) m: u8,
    /// `n` wrapped past 63; nothing more is written.
    pub(crate) n_overflow: bool,
    /// A ninth in-range sprite was found.
    pub(crate) sp_overflow: bool,
    /// Sprites copied into secondary OAM (0..=8).
    pub(crate) sp_got: u8,
    /// Bytes still to copy for the current in-range sprite.
    pub(crate) cp_counter: u8,
    /// Byte read on the last odd dot.
    pub(crate) latch: u8,
    /// OAMADDR at dot 65.
    pub(crate) init_oam_addr: u8,
    /// Secondary OAM write cursor (0..=32).
    pub(crate) write_idx: u8,
    /// The first sprite walked was in range.
    pub(crate) with_sp0_next: bool,
}

impl SpriteEval {
    fn oam_addr(&self) -> u8 {
        self.init_oam_addr
            .wrapping_add(self.n.wrapping_mul(OAM_ENTRY_SIZE as u8))
            .wrapping_add(self.m)
    }

    fn advance_n(&mut self) {
        self.n += 1;
        if self.n == SPRITE_COUNT {
            self.n = 0;
            self.n_overflow = true;
        }
    }

    /// `m` increment with carry into `n`.
    fn advance_m(&mut self) {
        self.m = (self.m + 1) & 0b11;
        if self.m == 0 {
            self.advance_n();
        }
    }

    fn halted(&self) -> bool {
        self.n_overflow || (self.sp_overflow && self.cp_counter == 0)
    }
}

pub(crate) fn tick(ctx: &mut PipelineContext, regs: &mut Registers) {
    let dot = ctx.dot;
    match dot {
        1..=64 => clear_secondary(ctx, dot),
        65..=256 => {
            if dot == 65 {
                start(ctx, regs);
            }
            if dot % 2 == 1 {
                let addr = ctx.eval.oam_addr();
                ctx.eval.latch = regs.oam[addr as usize];
                regs.oam_addr = addr;
            } else {
                evaluate(ctx, regs);
                regs.oam_addr = ctx.eval.oam_addr();
            }
        }
        _ => {}
    }
}

fn clear_secondary(ctx: &mut PipelineContext, dot: u16) {
    if dot % 2 == 1 {
        ctx.eval.latch = 0xFF;
    } else {
        ctx.sec_oam[(dot / 2 - 1) as usize] = ctx.eval.latch;
    }
}

fn start(ctx: &mut PipelineContext, regs: &Registers) {
    ctx.eval = SpriteEval {
        init_oam_addr: regs.oam_addr,
        ..SpriteEval::default()
    };
}

fn evaluate(ctx: &mut PipelineContext, regs: &mut Registers) {
    let eval = &mut ctx.eval;
    if eval.halted() {
        eval.advance_n();
        return;
    }

    let full = eval.sp_got as usize == SPRITES_PER_LINE;

    if eval.cp_counter > 0 {
        if !full {
            ctx.sec_oam[eval.write_idx as usize] = eval.latch;
            eval.write_idx += 1;
        }
        eval.cp_counter -= 1;
        eval.advance_m();
        if eval.cp_counter == 0 && !full {
            eval.sp_got += 1;
        }
        return;
    }

    let row = ctx.scanline as i16 - i16::from(eval.latch);
    let in_range = (0..regs.control.sprite_height()).contains(&row);

    if !full {
        if (eval.write_idx as usize) < ppu_mem::SECONDARY_OAM_RAM_SIZE {
            ctx.sec_oam[eval.write_idx as usize] = eval.latch;
        }
        if in_range {
            if eval.n == 0 {
                eval.with_sp0_next = true;
            }
            eval.write_idx += 1;
            eval.cp_counter = 3;
            eval.m = 1;
        } else {
            eval.advance_n();
        }
    } else if in_range {
        trace!(scanline = ctx.scanline, n = eval.n, m = eval.m, "sprite overflow");
        regs.status.insert(Status::SPRITE_OVERFLOW);
        eval.sp_overflow = true;
        eval.cp_counter = 3;
        eval.advance_m();
    } else {
        // Hardware bug: both counters move, `m` without carry.
        eval.advance_n();
        eval.m = (eval.m + 1) & 0b11;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::registers::Control;

    fn run_line(ctx: &mut PipelineContext, regs: &mut Registers, scanline: u16) {
        ctx.scanline = scanline;
        for dot in 1..=256 {
            ctx.dot = dot;
            tick(ctx, regs);
        }
    }

    fn place(regs: &mut Registers, index: usize, y: u8, tile: u8, attr: u8, x: u8) {
        regs.oam[index * 4..index * 4 + 4].copy_from_slice(&[y, tile, attr, x]);
    }

    fn fresh() -> (PipelineContext, Registers) {
        let mut regs = Registers::new();
        // Park every sprite off screen.
        regs.oam.fill(0xEF);
        (PipelineContext::default(), regs)
    }

    #[test]
    fn copies_in_range_sprites_in_oam_order() {
        let (mut ctx, mut regs) = fresh();
        place(&mut regs, 3, 20, 0x11, 0x01, 40);
        place(&mut regs, 9, 15, 0x22, 0x02, 50);
        place(&mut regs, 10, 30, 0x33, 0x03, 60);
        run_line(&mut ctx, &mut regs, 22);

        assert_eq!(ctx.eval.sp_got, 2);
        assert!(!ctx.eval.with_sp0_next);
        assert_eq!(&ctx.sec_oam[0..8], &[20, 0x11, 0x01, 40, 15, 0x22, 0x02, 50]);
        // Missed Y bytes still land in the next free slot.
        assert_eq!(ctx.sec_oam[8], 0xEF);
        assert!(ctx.sec_oam[9..].iter().all(|&b| b == 0xFF));
        assert!(!regs.status.contains(Status::SPRITE_OVERFLOW));
    }

    #[test]
    fn sprite_zero_is_flagged() {
        let (mut ctx, mut regs) = fresh();
        place(&mut regs, 0, 100, 1, 0, 8);
        run_line(&mut ctx, &mut regs, 107);
        assert_eq!(ctx.eval.sp_got, 1);
        assert!(ctx.eval.with_sp0_next);

        // Row 8 is outside an 8x8 sprite but inside an 8x16 one.
        run_line(&mut ctx, &mut regs, 108);
        assert_eq!(ctx.eval.sp_got, 0);
        regs.control = Control::SPRITE_SIZE_16;
        run_line(&mut ctx, &mut regs, 108);
        assert_eq!(ctx.eval.sp_got, 1);
    }

    #[test]
    fn ninth_sprite_sets_overflow() {
        let (mut ctx, mut regs) = fresh();
        for i in 0..9 {
            place(&mut regs, i, 50, i as u8, 0, 0);
        }
        run_line(&mut ctx, &mut regs, 52);
        assert_eq!(ctx.eval.sp_got, 8);
        assert!(regs.status.contains(Status::SPRITE_OVERFLOW));
        // Only the first eight made it into secondary OAM.
        let tiles: Vec<u8> = ctx.sec_oam.chunks(4).map(|s| s[1]).collect();
        assert_eq!(tiles, [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn exactly_eight_sprites_do_not_overflow() {
        let (mut ctx, mut regs) = fresh();
        for i in 0..8 {
            place(&mut regs, i * 2, 50, i as u8, 0, 0);
        }
        run_line(&mut ctx, &mut regs, 50);
        assert_eq!(ctx.eval.sp_got, 8);
        assert!(!regs.status.contains(Status::SPRITE_OVERFLOW));
        assert!(ctx.eval.n_overflow);
    }

    #[test]
    fn overflow_walk_reads_misaligned_bytes() {
        // After eight hits, sprite 8 misses on Y, so the walk tests sprite 9's
        // tile byte (m = 1) as a Y coordinate. A tile value in range reports
        // overflow even though sprite 9's real Y is off screen.
        let (mut ctx, mut regs) = fresh();
        for i in 0..8 {
            place(&mut regs, i, 50, 0, 0, 0);
        }
        place(&mut regs, 9, 0xEF, 51, 0, 0);
        run_line(&mut ctx, &mut regs, 52);
        assert!(regs.status.contains(Status::SPRITE_OVERFLOW));

        // With that tile byte out of range the false positive disappears.
        let (mut ctx, mut regs) = fresh();
        for i in 0..8 {
            place(&mut regs, i, 50, 0, 0, 0);
        }
        place(&mut regs, 9, 0xEF, 0xEF, 0xEF, 0xEF);
        run_line(&mut ctx, &mut regs, 52);
        assert!(!regs.status.contains(Status::SPRITE_OVERFLOW));
    }

    #[test]
    fn oam_addr_follows_the_walk() {
        let (mut ctx, mut regs) = fresh();
        regs.oam_addr = 0;
        ctx.scanline = 10;
        for dot in 1..=70 {
            ctx.dot = dot;
            tick(&mut ctx, &mut regs);
        }
        // Dots 65-70: three misses, n advanced to 3.
        assert_eq!(ctx.eval.n, 3);
        assert_eq!(regs.oam_addr, 12);
    }
}

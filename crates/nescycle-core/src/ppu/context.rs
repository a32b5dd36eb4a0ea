use super::{
    background_pipeline::BgShifters,
    registers::VramRegisters,
    sprite_eval::SpriteEval,
    sprite_fetch::SpriteFetch,
    sprite_pipeline::SpriteShifters,
};
use crate::mem_block::ppu::SecondaryOamRam;

/// Background fetch latches, filled during the 8-dot tile cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct BgLatches {
    pub(crate) nt_byte: u8,
    /// 2-bit palette selected from the attribute byte.
    pub(crate) attr_palette_idx: u8,
    pub(crate) lower_sliver: u8,
    pub(crate) upper_sliver: u8,
}

/// Everything the pipeline units share, mutated once per dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PipelineContext {
    /// 0-239 visible, 240 post-render, 241-260 vblank, 261 pre-render.
    pub(crate) scanline: u16,
    /// 0..=340.
    pub(crate) dot: u16,
    /// Next output pixel.
    pub(crate) pixel_row: u16,
    pub(crate) pixel_col: u16,
    pub(crate) vram: VramRegisters,
    pub(crate) bg: BgLatches,
    pub(crate) bg_shifters: BgShifters,
    pub(crate) sec_oam: SecondaryOamRam,
    pub(crate) eval: SpriteEval,
    pub(crate) fetch: SpriteFetch,
    pub(crate) sprites: SpriteShifters,
    /// Slot 0 holds the first sprite the evaluation walked.
    pub(crate) with_sp0: bool,
    pub(crate) is_odd_frame: bool,
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self {
            scanline: super::PRE_RENDER_SCANLINE,
            dot: 0,
            pixel_row: 0,
            pixel_col: 0,
            vram: VramRegisters::default(),
            bg: BgLatches::default(),
            bg_shifters: BgShifters::default(),
            sec_oam: SecondaryOamRam::filled(0xFF),
            eval: SpriteEval::default(),
            fetch: SpriteFetch::default(),
            sprites: SpriteShifters::default(),
            with_sp0: false,
            is_odd_frame: false,
        }
    }
}

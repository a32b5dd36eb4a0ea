use super::{
    savestate::SpriteSlotState,
    sprite::{SPRITES_PER_LINE, SpriteAttributes},
};

/// One of the eight sprite output units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpriteSlot {
    /// Lower bitplane, already reversed for horizontally flipped sprites.
    pub(crate) pattern_low: u8,
    pub(crate) pattern_high: u8,
    pub(crate) attributes: SpriteAttributes,
    /// Dots left before the sprite starts; loaded with `X + 1`.
    pub(crate) x_counter: u16,
    /// Pixels left to shift out once the countdown expired (0..=8).
    pub(crate) active: u8,
}

impl SpriteSlot {
    /// Advances this slot by one dot and returns its pattern bits (0 when idle).
    fn step(&mut self) -> u8 {
        if self.x_counter > 0 {
            self.x_counter -= 1;
            if self.x_counter == 0 {
                self.active = 8;
            }
        }
        if self.active == 0 {
            return 0;
        }
        let pattern = ((self.pattern_high >> 7) << 1) | (self.pattern_low >> 7);
        self.pattern_low <<= 1;
        self.pattern_high <<= 1;
        self.active -= 1;
        pattern
    }
}

/// Sprite pixel chosen for one dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpritePixel {
    pub(crate) palette: u8,
    /// 0 means transparent.
    pub(crate) pattern: u8,
    pub(crate) behind_background: bool,
    pub(crate) is_sprite0: bool,
}

impl SpritePixel {
    pub(crate) fn is_opaque(self) -> bool {
        self.pattern != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpriteShifters {
    slots: [SpriteSlot; SPRITES_PER_LINE],
}

impl SpriteShifters {
    pub(crate) fn load(&mut self, index: usize, slot: SpriteSlot) {
        self.slots[index] = slot;
    }

    #[cfg(test)]
    pub(crate) fn slot(&self, index: usize) -> &SpriteSlot {
        &self.slots[index]
    }

    /// Steps every slot once and returns the first opaque pixel in slot order.
    ///
    /// All slots advance even after a winner is found. `with_sp0` marks slot 0
    /// as holding sprite 0.
    pub(crate) fn step(&mut self, with_sp0: bool) -> SpritePixel {
        let mut chosen = SpritePixel::default();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let pattern = slot.step();
            if pattern != 0 && !chosen.is_opaque() {
                chosen = SpritePixel {
                    palette: slot.attributes.palette(),
                    pattern,
                    behind_background: slot.attributes.behind_background(),
                    is_sprite0: with_sp0 && index == 0,
                };
            }
        }
        chosen
    }

    pub(crate) fn save_state(&self) -> [SpriteSlotState; SPRITES_PER_LINE] {
        self.slots.map(|slot| SpriteSlotState {
            pattern_low: slot.pattern_low,
            pattern_high: slot.pattern_high,
            attributes: slot.attributes.bits(),
            x_counter: slot.x_counter,
            active: slot.active,
        })
    }

    pub(crate) fn load_state(&mut self, state: &[SpriteSlotState; SPRITES_PER_LINE]) {
        self.slots = state.map(|slot| SpriteSlot {
            pattern_low: slot.pattern_low,
            pattern_high: slot.pattern_high,
            attributes: SpriteAttributes::from_bits_retain(slot.attributes),
            x_counter: slot.x_counter,
            active: slot.active.min(8),
        });
    }
}

use super::savestate::BgShifterState;

/// 16-bit left-shifting register.
///
/// ```text
/// [ high byte: pixels on screen now | low byte: next tile ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct Shift16(u16);

impl Shift16 {
    /// Replaces the low byte, keeping the high byte in flight.
    #[inline]
    fn load_low_byte(&mut self, byte: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(byte);
    }

    #[cfg(test)]
    fn low_byte(self) -> u8 {
        self.0 as u8
    }

    /// Bit `15 - fine_x`; fine X offsets the sampled bit instead of delaying shifts.
    #[inline]
    fn bit_with_fine_x(self, fine_x: u8) -> u8 {
        let shift = 15 - (fine_x & 0b111);
        ((self.0 >> shift) & 1) as u8
    }

    #[inline]
    fn shift(&mut self) {
        self.0 <<= 1;
    }
}

/// The four background shifters: two pattern bitplanes and two palette bits.
///
/// Palette shifters get the 2-bit attribute replicated across their low byte
/// (`0x00` or `0xFF` per bit) so every pixel of a tile row carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct BgShifters {
    /// `[lower bitplane, upper bitplane]`.
    pattern: [Shift16; 2],
    /// `[palette bit 0, palette bit 1]`.
    palette: [Shift16; 2],
}

impl BgShifters {
    /// Loads the latched tile row into the low bytes.
    pub(crate) fn reload(&mut self, lower_sliver: u8, upper_sliver: u8, palette_idx: u8) {
        self.pattern[0].load_low_byte(lower_sliver);
        self.pattern[1].load_low_byte(upper_sliver);
        for (bit, shifter) in self.palette.iter_mut().enumerate() {
            let repeated = if (palette_idx >> bit) & 1 != 0 { 0xFF } else { 0x00 };
            shifter.load_low_byte(repeated);
        }
    }

    /// Returns `(palette, pattern)`, each 0..=3.
    pub(crate) fn sample(&self, fine_x: u8) -> (u8, u8) {
        let pattern = (self.pattern[1].bit_with_fine_x(fine_x) << 1)
            | self.pattern[0].bit_with_fine_x(fine_x);
        let palette = (self.palette[1].bit_with_fine_x(fine_x) << 1)
            | self.palette[0].bit_with_fine_x(fine_x);
        (palette, pattern)
    }

    pub(crate) fn shift(&mut self) {
        for shifter in self.pattern.iter_mut().chain(self.palette.iter_mut()) {
            shifter.shift();
        }
    }

    /// Low bytes as `[pattern lo, pattern hi, palette lo, palette hi]`.
    #[cfg(test)]
    pub(crate) fn low_bytes(&self) -> [u8; 4] {
        [
            self.pattern[0].low_byte(),
            self.pattern[1].low_byte(),
            self.palette[0].low_byte(),
            self.palette[1].low_byte(),
        ]
    }

    pub(crate) fn save_state(&self) -> BgShifterState {
        BgShifterState {
            pattern: [self.pattern[0].0, self.pattern[1].0],
            palette: [self.palette[0].0, self.palette[1].0],
        }
    }

    pub(crate) fn load_state(&mut self, state: &BgShifterState) {
        self.pattern = [Shift16(state.pattern[0]), Shift16(state.pattern[1])];
        self.palette = [Shift16(state.palette[0]), Shift16(state.palette[1])];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_keeps_high_byte_and_replicates_palette() {
        let mut shifters = BgShifters::default();
        shifters.reload(0b1000_0001, 0b0000_0001, 0b10);
        assert_eq!(shifters.low_bytes(), [0x81, 0x01, 0x00, 0xFF]);

        for _ in 0..8 {
            shifters.shift();
        }
        shifters.reload(0x00, 0xFF, 0b01);
        // Previous row now sits in the high byte.
        assert_eq!(shifters.sample(0), (0b10, 0b01));
        assert_eq!(shifters.sample(7), (0b10, 0b11));
        assert_eq!(shifters.low_bytes(), [0x00, 0xFF, 0xFF, 0x00]);
    }

    #[test]
    fn shift_moves_exactly_one_bit() {
        let mut shifters = BgShifters::default();
        shifters.reload(0b0100_0000, 0, 0);
        for _ in 0..8 {
            shifters.shift();
        }
        assert_eq!(shifters.sample(0), (0, 0));
        assert_eq!(shifters.sample(1), (0, 1));
        shifters.shift();
        assert_eq!(shifters.sample(0), (0, 1));
    }
}

//! Noise channel.

use crate::units::{Envelope, LengthCounter, NOISE_PERIOD_TABLE, NoiseShiftRegister, Timer};

/// Noise channel: an LFSR clocked by a table-driven timer, shaped by an
/// envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Noise {
    pub envelope: Envelope,
    pub timer: Timer,
    pub length: LengthCounter,
    pub shift: NoiseShiftRegister,
    /// Short mode: feedback from bit 6 instead of bit 1.
    pub short_mode: bool,
    pub enabled: bool,
}

impl Noise {
    /// Write one of the channel's registers (`register` is 0–3; 1 is unused).
    pub fn write(&mut self, register: u8, value: u8) {
        match register {
            0 => {
                self.envelope.write(value);
                self.length.halt = value & 0x20 != 0;
            }
            2 => {
                self.timer.period = NOISE_PERIOD_TABLE[(value & 0x0F) as usize];
                self.short_mode = value & 0x80 != 0;
            }
            3 => {
                self.length.set(value >> 3);
                self.envelope.start = true;
            }
            _ => {}
        }
    }

    /// Clock the timer (called at APU cycle rate = CPU/2).
    pub fn clock(&mut self) {
        if self.timer.clock() {
            self.shift.clock(self.short_mode);
        }
    }

    /// Quarter-frame: clock the envelope.
    pub fn quarter_frame(&mut self) {
        self.envelope.clock();
    }

    /// Half-frame: clock the length counter.
    pub fn half_frame(&mut self) {
        self.length.clock();
    }

    /// Status-register enable. Disabling clears the length counter.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length.counter = 0;
        }
    }

    /// Current output (0–15).
    #[must_use]
    pub fn output(&self) -> u8 {
        if self.enabled && self.length.enabled() && !self.shift.muted() {
            self.envelope.output()
        } else {
            0
        }
    }
}

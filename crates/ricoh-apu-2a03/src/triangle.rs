//! Triangle channel.

use crate::units::{LengthCounter, LinearCounter, TRIANGLE_SEQUENCE, Timer};

/// Triangle wave channel. The timer ticks at CPU rate (not APU rate).
/// Uses a 32-step sequence gated by both a length counter and a linear
/// counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Triangle {
    pub linear: LinearCounter,
    pub timer: Timer,
    pub length: LengthCounter,
    /// Sequence position (0–31).
    pub step: u8,
    pub enabled: bool,
}

impl Triangle {
    /// Write one of the channel's registers (`register` is 0–3; 1 is unused).
    pub fn write(&mut self, register: u8, value: u8) {
        match register {
            0 => {
                self.linear.write(value);
                self.length.halt = value & 0x80 != 0;
            }
            2 => self.timer.set_low(value),
            3 => {
                self.timer.set_high(value);
                self.length.set(value >> 3);
                self.linear.halt = true;
            }
            _ => {}
        }
    }

    /// Clock the timer (called every CPU cycle). The sequence only
    /// advances while both counters are non-zero.
    pub fn clock(&mut self) {
        if self.timer.clock() && self.length.enabled() && self.linear.counter > 0 {
            self.step = (self.step + 1) % 32;
        }
    }

    /// Quarter-frame: clock the linear counter.
    pub fn quarter_frame(&mut self) {
        self.linear.clock();
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
        if self.enabled && self.linear.counter > 0 && self.length.enabled() {
            TRIANGLE_SEQUENCE[self.step as usize]
        } else {
            0
        }
    }
}

//! Pulse (square) channel.

use crate::units::{Duty, Envelope, LengthCounter, MAX_TIMER_PERIOD, Sweep, Timer};

/// Periods below this are ultrasonic and silenced by the hardware.
const MIN_AUDIBLE_PERIOD: u16 = 8;

/// Pulse wave channel (two instances: pulse 1 and pulse 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pulse {
    pub envelope: Envelope,
    pub timer: Timer,
    pub length: LengthCounter,
    pub sweep: Sweep,
    pub duty: Duty,
    pub enabled: bool,
}

impl Pulse {
    /// Create a pulse channel whose sweep negates with the given offset
    /// (-1 for pulse 1, 0 for pulse 2).
    #[must_use]
    pub fn new(negate_offset: i8) -> Self {
        Self {
            envelope: Envelope::default(),
            timer: Timer::default(),
            length: LengthCounter::default(),
            sweep: Sweep::new(negate_offset),
            duty: Duty::default(),
            enabled: false,
        }
    }

    /// Write one of the channel's four registers (`register` is 0–3).
    pub fn write(&mut self, register: u8, value: u8) {
        match register {
            0 => {
                self.envelope.write(value);
                self.duty.kind = value >> 6;
                self.length.halt = value & 0x20 != 0;
            }
            1 => self.sweep.write(value),
            2 => self.timer.set_low(value),
            3 => {
                self.timer.set_high(value);
                self.length.set(value >> 3);
                self.envelope.start = true;
                self.duty.step = 0;
            }
            _ => {}
        }
    }

    /// Clock the timer (called at APU cycle rate = CPU/2).
    pub fn clock(&mut self) {
        if self.timer.clock() {
            self.duty.clock();
        }
    }

    /// Quarter-frame: clock the envelope.
    pub fn quarter_frame(&mut self) {
        self.envelope.clock();
    }

    /// Half-frame: clock the length counter and apply the sweep.
    pub fn half_frame(&mut self) {
        self.length.clock();
        if self.sweep.clock() && self.sweep.enabled && self.sweep.shift > 0 {
            let target = self.sweep.target(self.timer.period);
            if target <= MAX_TIMER_PERIOD {
                self.timer.period = target;
            }
        }
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
        let period = self.timer.period;
        if self.enabled
            && self.duty.high()
            && self.length.enabled()
            && period >= MIN_AUDIBLE_PERIOD
            && !self.sweep.overflows(period)
        {
            self.envelope.output()
        } else {
            0
        }
    }
}

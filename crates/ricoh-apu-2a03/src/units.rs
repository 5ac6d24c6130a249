//! Generator units shared by the channels.
//!
//! Each unit is a small state machine clocked either by its channel (every
//! CPU or APU cycle) or by the frame sequencer (quarter/half frame). The
//! channels compose them by value; none of them knows which channel owns it.

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

/// Length counter load values, indexed by the top 5 bits of the register write.
pub const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96,
    22, 192, 24, 72, 26, 16, 28, 32, 30,
];

/// Noise timer period lookup (NTSC), in CPU cycles.
pub const NOISE_PERIOD_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// Triangle waveform: 32-step sequence (15–0 down, 0–15 up).
pub const TRIANGLE_SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10,
    11, 12, 13, 14, 15,
];

/// Pulse duty cycle waveforms: 4 patterns × 8 steps.
/// 0 = 12.5%, 1 = 25%, 2 = 50%, 3 = 75% (negated 25%).
pub const PULSE_DUTY: [[bool; 8]; 4] = [
    [false, true, false, false, false, false, false, false],  // 12.5%
    [false, true, true, false, false, false, false, false],   // 25%
    [false, true, true, true, true, false, false, false],     // 50%
    [true, false, false, true, true, true, true, true],       // 75%
];

/// Largest period an 11-bit timer can hold.
pub const MAX_TIMER_PERIOD: u16 = 0x7FF;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Decay envelope, clocked at quarter-frame rate.
///
/// When the loop flag is clear, the envelope counts down from 15 to 0 and
/// stays there. When loop is set, it wraps from 0 back to 15.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Volume / divider period (register bits 0–3).
    pub volume: u8,
    pub divider: u8,
    /// Decay level (0–15).
    pub counter: u8,
    /// Loop flag (register bit 5, shared with length counter halt).
    pub loop_flag: bool,
    /// Constant volume flag (register bit 4).
    pub constant: bool,
    /// Restart pending; set by a write to the channel's fourth register.
    pub start: bool,
}

impl Envelope {
    /// Latch the control bits of a `$4000`/`$4004`/`$400C` write.
    pub fn write(&mut self, value: u8) {
        self.volume = value & 0x0F;
        self.constant = value & 0x10 != 0;
        self.loop_flag = value & 0x20 != 0;
    }

    /// Clock the envelope (called at quarter-frame rate).
    pub fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.counter = 15;
        } else if self.divider == 0 {
            self.divider = self.volume;
            if self.counter > 0 {
                self.counter -= 1;
            } else if self.loop_flag {
                self.counter = 15;
            }
        } else {
            self.divider -= 1;
        }
    }

    /// Current output level (0–15).
    #[must_use]
    pub fn output(&self) -> u8 {
        if self.constant {
            self.volume
        } else {
            self.counter
        }
    }
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// 11-bit down-counter that reloads from `period` on underflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timer {
    pub tick: u16,
    pub period: u16,
}

impl Timer {
    /// Clock the timer. Returns true on the clock that reloads the counter.
    pub fn clock(&mut self) -> bool {
        if self.tick == 0 {
            self.tick = self.period;
            true
        } else {
            self.tick -= 1;
            false
        }
    }

    /// Replace the low 8 bits of the period.
    pub fn set_low(&mut self, value: u8) {
        self.period = (self.period & 0x0700) | u16::from(value);
    }

    /// Replace the high 3 bits of the period (bits 0–2 of `value`).
    pub fn set_high(&mut self, value: u8) {
        self.period = (self.period & 0x00FF) | (u16::from(value & 0x07) << 8);
    }
}

// ---------------------------------------------------------------------------
// Length counter
// ---------------------------------------------------------------------------

/// Length counter. Counts down at half-frame rate; the channel is silent
/// once it reaches zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LengthCounter {
    pub halt: bool,
    pub counter: u8,
}

impl LengthCounter {
    /// Load a new value from the length table (5-bit code).
    pub fn set(&mut self, code: u8) {
        self.counter = LENGTH_TABLE[(code & 0x1F) as usize];
    }

    /// Clock the length counter (called at half-frame rate).
    pub fn clock(&mut self) {
        if !self.halt && self.counter > 0 {
            self.counter -= 1;
        }
    }

    /// Whether the channel is allowed to sound (counter > 0).
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.counter != 0
    }
}

// ---------------------------------------------------------------------------
// Sweep unit
// ---------------------------------------------------------------------------

/// Sweep unit for pulse channels.
///
/// Pulse 1 negates with one's complement (`negate_offset = -1`), pulse 2
/// with two's complement (`negate_offset = 0`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sweep {
    pub shift: u8,
    pub negate: bool,
    pub period: u8,
    pub enabled: bool,
    pub divider: u8,
    /// Divider reload pending; set by every register write.
    pub reset: bool,
    pub negate_offset: i8,
}

impl Sweep {
    #[must_use]
    pub fn new(negate_offset: i8) -> Self {
        Self {
            negate_offset,
            ..Self::default()
        }
    }

    /// Latch a `$4001`/`$4005` write.
    pub fn write(&mut self, value: u8) {
        self.shift = value & 0x07;
        self.negate = value & 0x08 != 0;
        self.period = (value >> 4) & 0x07;
        self.enabled = value & 0x80 != 0;
        self.reset = true;
    }

    /// Clock the sweep divider (called at half-frame rate). Returns true when
    /// the divider expired on this clock.
    pub fn clock(&mut self) -> bool {
        let fired = if self.divider == 0 {
            self.divider = self.period;
            true
        } else {
            self.divider -= 1;
            false
        };
        if self.reset {
            self.divider = 0;
            self.reset = false;
        }
        fired
    }

    /// Target period for the given timer period, clamped to `0..=0x800`.
    #[must_use]
    pub fn target(&self, period: u16) -> u16 {
        let current = i32::from(period);
        let change = i32::from(period >> self.shift);
        let target = if self.negate {
            current - change + i32::from(self.negate_offset)
        } else {
            current + change
        };
        target.clamp(0, i32::from(MAX_TIMER_PERIOD) + 1) as u16
    }

    /// Whether the target period has left the 11-bit range. A zero shift
    /// never overflows.
    #[must_use]
    pub fn overflows(&self, period: u16) -> bool {
        self.shift > 0 && self.target(period) > MAX_TIMER_PERIOD
    }
}

// ---------------------------------------------------------------------------
// Duty sequencer
// ---------------------------------------------------------------------------

/// 8-step duty sequencer for pulse channels. Steps count downwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duty {
    /// Waveform selection (0–3).
    pub kind: u8,
    /// Sequence position (0–7).
    pub step: u8,
}

impl Duty {
    pub fn clock(&mut self) {
        self.step = if self.step == 0 { 7 } else { self.step - 1 };
    }

    /// Whether the waveform is high at the current step.
    #[must_use]
    pub fn high(&self) -> bool {
        PULSE_DUTY[(self.kind & 0x03) as usize][(self.step & 0x07) as usize]
    }
}

// ---------------------------------------------------------------------------
// Linear counter
// ---------------------------------------------------------------------------

/// Triangle linear counter, clocked at quarter-frame rate.
///
/// `halt` is the reload flag: set by a write to `$400B`, it makes the next
/// clock reload the counter, and stays set only while `control` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearCounter {
    /// Reload value (7 bits).
    pub reload: u8,
    pub halt: bool,
    /// Control flag (`$4008` bit 7, shared with length counter halt).
    pub control: bool,
    pub counter: u8,
}

impl LinearCounter {
    /// Latch a `$4008` write.
    pub fn write(&mut self, value: u8) {
        self.control = value & 0x80 != 0;
        self.reload = value & 0x7F;
    }

    pub fn clock(&mut self) {
        if self.halt {
            self.counter = self.reload;
        } else if self.counter > 0 {
            self.counter -= 1;
        }
        if !self.control {
            self.halt = false;
        }
    }
}

// ---------------------------------------------------------------------------
// Noise shift register
// ---------------------------------------------------------------------------

/// 15-bit linear feedback shift register.
///
/// Feedback is bit 0 XOR bit 1 in long mode, bit 0 XOR bit 6 in short mode.
/// Seeded to 1 at power-up; never reaches zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseShiftRegister {
    pub bits: u16,
}

impl Default for NoiseShiftRegister {
    fn default() -> Self {
        Self { bits: 1 }
    }
}

impl NoiseShiftRegister {
    pub fn clock(&mut self, short_mode: bool) {
        let tap = if short_mode { 6 } else { 1 };
        let feedback = (self.bits & 1) ^ ((self.bits >> tap) & 1);
        self.bits >>= 1;
        self.bits |= feedback << 14;
    }

    /// Bit 0 gates the output: set means silence.
    #[must_use]
    pub fn muted(&self) -> bool {
        self.bits & 1 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_set_matches_table_for_every_code() {
        let mut length = LengthCounter::default();
        for (code, &expected) in LENGTH_TABLE.iter().enumerate() {
            length.set(code as u8);
            assert_eq!(length.counter, expected, "code {code}");
        }
    }

    #[test]
    fn length_uses_low_five_bits_only() {
        let mut length = LengthCounter::default();
        length.set(0x21);
        assert_eq!(length.counter, 254);
    }

    #[test]
    fn length_halt_freezes_counter() {
        let mut length = LengthCounter::default();
        length.set(3); // 2
        length.halt = true;
        length.clock();
        assert_eq!(length.counter, 2);
        length.halt = false;
        length.clock();
        length.clock();
        length.clock();
        assert_eq!(length.counter, 0);
        assert!(!length.enabled());
    }

    #[test]
    fn timer_fires_once_per_period() {
        let mut timer = Timer {
            tick: 0,
            period: 3,
        };
        let fired: Vec<bool> = (0..8).map(|_| timer.clock()).collect();
        assert_eq!(fired, [true, false, false, false, true, false, false, false]);
    }

    #[test]
    fn lowering_period_mid_count_waits_for_underflow() {
        let mut timer = Timer {
            tick: 0,
            period: 10,
        };
        assert!(timer.clock());
        assert!(!timer.clock());
        assert!(!timer.clock());
        assert_eq!(timer.tick, 8);

        timer.period = 5;
        let fired: Vec<bool> = (0..4).map(|_| timer.clock()).collect();
        assert_eq!(fired, [false; 4]);
        assert_eq!(timer.tick, 4);
    }

    #[test]
    fn timer_period_from_both_registers() {
        let mut timer = Timer::default();
        timer.set_low(0xFD);
        timer.set_high(0xF9);
        assert_eq!(timer.period, 0x1FD);
        timer.set_low(0x01);
        assert_eq!(timer.period, 0x101);
    }

    #[test]
    fn envelope_start_resets_decay() {
        let mut env = Envelope::default();
        env.write(0x02); // divider period 2, decaying
        env.start = true;
        env.clock();
        assert!(!env.start);
        assert_eq!(env.output(), 15);
        // Divider reloads to 2 and must count back to 0 before the next step.
        env.clock();
        assert_eq!(env.output(), 14);
        env.clock();
        env.clock();
        assert_eq!(env.output(), 14);
        env.clock();
        assert_eq!(env.output(), 13);
    }

    #[test]
    fn envelope_floors_without_loop_and_wraps_with_it() {
        let mut env = Envelope::default();
        env.start = true;
        env.clock();
        for _ in 0..20 {
            env.clock();
        }
        assert_eq!(env.output(), 0);

        env.loop_flag = true;
        env.clock();
        assert_eq!(env.output(), 15);
    }

    #[test]
    fn envelope_constant_volume() {
        let mut env = Envelope::default();
        env.write(0x1A);
        assert_eq!(env.output(), 10);
        env.start = true;
        env.clock();
        assert_eq!(env.output(), 10);
    }

    #[test]
    fn sweep_reset_forces_divider_to_zero() {
        let mut sweep = Sweep::new(0);
        sweep.write(0xF1); // enabled, period 7, shift 1
        sweep.divider = 5;
        assert!(!sweep.clock());
        assert_eq!(sweep.divider, 0);
        assert!(!sweep.reset);
        assert!(sweep.clock());
        assert_eq!(sweep.divider, 7);
    }

    #[test]
    fn sweep_negate_offsets_differ_per_pulse() {
        let mut ones = Sweep::new(-1);
        let mut twos = Sweep::new(0);
        ones.write(0x09); // negate, shift 1
        twos.write(0x09);
        assert_eq!(ones.target(0x100), 0x100 - 0x80 - 1);
        assert_eq!(twos.target(0x100), 0x100 - 0x80);
    }

    #[test]
    fn sweep_target_clamps() {
        let mut sweep = Sweep::new(-1);
        sweep.write(0x08); // negate, shift 0
        assert_eq!(sweep.target(0), 0);
        sweep.write(0x01); // add, shift 1
        assert_eq!(sweep.target(0x7FF), 0x800);
        assert!(sweep.overflows(0x7FF));
        assert!(!sweep.overflows(0x500));
    }

    #[test]
    fn duty_steps_down_and_wraps() {
        let mut duty = Duty { kind: 2, step: 0 };
        duty.clock();
        assert_eq!(duty.step, 7);
        duty.clock();
        assert_eq!(duty.step, 6);
        assert!(!duty.high());
        duty.step = 3;
        assert!(duty.high());
    }

    #[test]
    fn linear_counter_halt_quirk() {
        let mut linear = LinearCounter::default();
        linear.write(0x05); // control clear, reload 5
        linear.halt = true;
        linear.clock();
        assert_eq!(linear.counter, 5);
        assert!(!linear.halt, "control clear releases the halt flag");
        linear.clock();
        assert_eq!(linear.counter, 4);

        linear.write(0x85); // control set
        linear.halt = true;
        linear.clock();
        linear.clock();
        assert_eq!(linear.counter, 5, "halt held while control is set");
        assert!(linear.halt);
    }

    #[test]
    fn noise_short_mode_repeats_every_93_steps() {
        let mut lfsr = NoiseShiftRegister::default();
        for step in 1..93 {
            lfsr.clock(true);
            assert_ne!(lfsr.bits, 1, "returned to seed early at step {step}");
        }
        lfsr.clock(true);
        assert_eq!(lfsr.bits, 1);
    }

    #[test]
    fn noise_long_mode_is_maximal_length() {
        let mut lfsr = NoiseShiftRegister::default();
        let mut steps = 0u32;
        loop {
            lfsr.clock(false);
            steps += 1;
            if lfsr.bits == 1 {
                break;
            }
        }
        assert_eq!(steps, 32767);
    }

    #[test]
    fn noise_first_step_from_seed() {
        let mut lfsr = NoiseShiftRegister::default();
        lfsr.clock(false);
        // 1 ^ 0 = 1 fed into bit 14
        assert_eq!(lfsr.bits, 0x4000);
        assert!(!lfsr.muted());
    }
}

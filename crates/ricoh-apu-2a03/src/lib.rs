//! Ricoh 2A03 APU (NES audio processing unit).
//!
//! Two pulse channels, one triangle channel and one noise channel, driven by
//! a frame sequencer. The APU is memory-independent: the owner forwards
//! register writes, calls [`Apu::step`] once per CPU cycle (~1.789 MHz NTSC)
//! and [`Apu::frame_step`] at the frame sequencer rate (~240 Hz), and reads
//! the mixed level with [`Apu::output`] whenever it wants a sample.
//!
//! Pulse and noise timers decrement every other CPU cycle (APU cycle). The
//! triangle timer decrements every CPU cycle. The DMC channel and expansion
//! audio are not emulated; their registers are ignored.

pub mod frame;
pub mod mixer;
pub mod noise;
pub mod pulse;
pub mod triangle;
pub mod units;

use emu_core::{Observable, Value};

pub use frame::{FrameEvents, FrameMode, FrameSequencer};
pub use noise::Noise;
pub use pulse::Pulse;
pub use triangle::Triangle;

/// APU status register.
pub const STATUS_REGISTER: u16 = 0x4015;

/// NES APU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apu {
    pub pulse1: Pulse,
    pub pulse2: Pulse,
    pub triangle: Triangle,
    pub noise: Noise,
    pub frame: FrameSequencer,
    /// CPU cycle parity: pulse and noise clock on odd-numbered steps.
    pub odd_cycle: bool,
}

impl Apu {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pulse1: Pulse::new(-1),
            pulse2: Pulse::new(0),
            triangle: Triangle::default(),
            noise: Noise::default(),
            frame: FrameSequencer::default(),
            odd_cycle: false,
        }
    }

    /// Return to power-up state and run the player's register init
    /// sequence: all channel registers zeroed, channels 0–3 enabled,
    /// 4-step frame mode.
    pub fn reset(&mut self) {
        *self = Self::new();
        for address in 0x4000..=0x400F {
            self.write(address, 0x00);
        }
        self.write(STATUS_REGISTER, 0x0F);
        self.write(0x4017, 0x00);
    }

    /// Write an APU register.
    ///
    /// Only the low byte of the address is decoded, so every page of
    /// `$4000–$4FFF` aliases the register file. Unhandled registers (DMC,
    /// unused slots) are ignored.
    pub fn write(&mut self, address: u16, value: u8) {
        let register = (address & 0xFF) as u8;
        match register {
            0x00..=0x03 => self.pulse1.write(register & 0x03, value),
            0x04..=0x07 => self.pulse2.write(register & 0x03, value),
            0x08..=0x0B => self.triangle.write(register & 0x03, value),
            0x0C..=0x0F => self.noise.write(register & 0x03, value),
            0x15 => {
                self.pulse1.set_enabled(value & 0x01 != 0);
                self.pulse2.set_enabled(value & 0x02 != 0);
                self.triangle.set_enabled(value & 0x04 != 0);
                self.noise.set_enabled(value & 0x08 != 0);
            }
            0x17 => {
                let events = self.frame.write(value);
                self.apply_frame_events(events);
            }
            _ => {}
        }
    }

    /// Read `$4015`. Reading acknowledges the frame interrupt.
    pub fn read_status(&mut self) -> u8 {
        let status = self.peek_status();
        self.frame.irq_pending = false;
        status
    }

    /// Compute `$4015` without side effects.
    #[must_use]
    pub fn peek_status(&self) -> u8 {
        let mut status = 0u8;
        if self.pulse1.length.enabled() {
            status |= 0x01;
        }
        if self.pulse2.length.enabled() {
            status |= 0x02;
        }
        if self.triangle.length.enabled() {
            status |= 0x04;
        }
        if self.noise.length.enabled() {
            status |= 0x08;
        }
        if self.frame.irq_pending {
            status |= 0x40;
        }
        status
    }

    /// Tick the APU one CPU cycle.
    pub fn step(&mut self) {
        if self.odd_cycle {
            if self.pulse1.enabled {
                self.pulse1.clock();
            }
            if self.pulse2.enabled {
                self.pulse2.clock();
            }
            if self.noise.enabled {
                self.noise.clock();
            }
        }
        self.odd_cycle = !self.odd_cycle;

        if self.triangle.enabled {
            self.triangle.clock();
        }
    }

    /// Advance the frame sequencer one step.
    pub fn frame_step(&mut self) {
        let events = self.frame.clock();
        self.apply_frame_events(events);
    }

    fn apply_frame_events(&mut self, events: FrameEvents) {
        if events.quarter {
            self.pulse1.quarter_frame();
            self.pulse2.quarter_frame();
            self.triangle.quarter_frame();
            self.noise.quarter_frame();
        }
        if events.half {
            self.pulse1.half_frame();
            self.pulse2.half_frame();
            self.triangle.half_frame();
            self.noise.half_frame();
        }
    }

    /// Whether the frame sequencer has an interrupt pending.
    #[must_use]
    pub fn interrupt_pending(&self) -> bool {
        self.frame.irq_pending
    }

    /// Current channel levels: pulse 1, pulse 2, triangle, noise (each 0–15).
    #[must_use]
    pub fn channel_levels(&self) -> [u8; 4] {
        [
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
        ]
    }

    /// Mixed output level (0.0 to ~0.75).
    #[must_use]
    pub fn output(&self) -> f32 {
        let [p1, p2, tri, noise] = self.channel_levels();
        mixer::mix(p1, p2, tri, noise)
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Observable state
// ---------------------------------------------------------------------------

const QUERY_PATHS: &[&str] = &[
    "pulse1.period",
    "pulse1.length",
    "pulse1.envelope",
    "pulse1.duty",
    "pulse2.period",
    "pulse2.length",
    "pulse2.envelope",
    "pulse2.duty",
    "triangle.period",
    "triangle.length",
    "triangle.linear",
    "triangle.step",
    "noise.period",
    "noise.length",
    "noise.envelope",
    "noise.shift",
    "frame.mode",
    "frame.step",
    "frame.irq",
    "status",
    "output",
];

impl Observable for Apu {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pulse1.period" => Some(self.pulse1.timer.period.into()),
            "pulse1.length" => Some(self.pulse1.length.counter.into()),
            "pulse1.envelope" => Some(self.pulse1.envelope.output().into()),
            "pulse1.duty" => Some(self.pulse1.duty.kind.into()),
            "pulse2.period" => Some(self.pulse2.timer.period.into()),
            "pulse2.length" => Some(self.pulse2.length.counter.into()),
            "pulse2.envelope" => Some(self.pulse2.envelope.output().into()),
            "pulse2.duty" => Some(self.pulse2.duty.kind.into()),
            "triangle.period" => Some(self.triangle.timer.period.into()),
            "triangle.length" => Some(self.triangle.length.counter.into()),
            "triangle.linear" => Some(self.triangle.linear.counter.into()),
            "triangle.step" => Some(self.triangle.step.into()),
            "noise.period" => Some(self.noise.timer.period.into()),
            "noise.length" => Some(self.noise.length.counter.into()),
            "noise.envelope" => Some(self.noise.envelope.output().into()),
            "noise.shift" => Some(self.noise.shift.bits.into()),
            "frame.mode" => Some(self.frame.mode.steps().into()),
            "frame.step" => Some(self.frame.step.into()),
            "frame.irq" => Some(self.frame.irq_pending.into()),
            "status" => Some(self.peek_status().into()),
            "output" => Some(self.output().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reset_apu() -> Apu {
        let mut apu = Apu::new();
        apu.reset();
        apu
    }

    #[test]
    fn silent_by_default() {
        let mut apu = Apu::new();
        for _ in 0..100 {
            apu.step();
        }
        assert_eq!(apu.output(), 0.0);
    }

    #[test]
    fn reset_enables_all_channels_with_short_lengths() {
        let apu = reset_apu();
        assert!(apu.pulse1.enabled && apu.pulse2.enabled);
        assert!(apu.triangle.enabled && apu.noise.enabled);
        // Each $4xx3 write of zero loads length code 0 (10).
        assert_eq!(apu.pulse1.length.counter, 10);
        assert_eq!(apu.noise.length.counter, 10);
        assert_eq!(apu.pulse1.sweep.negate_offset, -1);
        assert_eq!(apu.pulse2.sweep.negate_offset, 0);
        assert_eq!(apu.noise.shift.bits, 1);
        assert_eq!(apu.frame.mode, FrameMode::FourStep);
    }

    #[test]
    fn pulse_produces_audio() {
        let mut apu = Apu::new();
        apu.write(0x4015, 0x01);
        apu.write(0x4000, 0xBF); // 50% duty, halt, constant volume 15
        apu.write(0x4002, 0xFD);
        apu.write(0x4003, 0x08);

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for _ in 0..10_000 {
            apu.step();
            let level = apu.output();
            min = min.min(level);
            max = max.max(level);
        }
        assert_eq!(min, 0.0);
        assert_eq!(max, mixer::pulse_table()[15]);
    }

    #[test]
    fn pulse_and_noise_clock_on_alternate_cycles() {
        let mut apu = Apu::new();
        apu.write(0x4015, 0x0F);
        apu.write(0x4002, 0x05);
        apu.write(0x4003, 0x00);
        apu.write(0x400A, 0x05);
        apu.write(0x400B, 0x00);

        apu.step(); // even: triangle only
        assert_eq!(apu.pulse1.timer.tick, 0);
        assert_eq!(apu.triangle.timer.tick, 5);
        apu.step(); // odd: pulse reloads
        assert_eq!(apu.pulse1.timer.tick, 5);
        assert_eq!(apu.triangle.timer.tick, 4);
    }

    #[test]
    fn disabled_channel_does_not_clock() {
        let mut apu = Apu::new();
        apu.write(0x4002, 0x05);
        apu.write(0x4003, 0x00);
        for _ in 0..10 {
            apu.step();
        }
        assert_eq!(apu.pulse1.timer.tick, 0);
    }

    #[test]
    fn status_register_reflects_length() {
        let mut apu = Apu::new();
        apu.write(0x4015, 0x05);
        apu.write(0x4003, 0x08);
        apu.write(0x4008, 0xFF);
        apu.write(0x400B, 0x08);

        let status = apu.read_status();
        assert_eq!(status & 0x0F, 0x05);
    }

    #[test]
    fn disable_channel_clears_length() {
        let mut apu = Apu::new();
        apu.write(0x4015, 0x01);
        apu.write(0x4003, 0x08);
        assert_eq!(apu.read_status() & 0x01, 0x01);

        apu.write(0x4015, 0x00);
        assert_eq!(apu.read_status() & 0x01, 0, "length should be cleared");
        assert!(!apu.pulse1.enabled);
    }

    #[test]
    fn status_read_acknowledges_interrupt() {
        let mut apu = reset_apu();
        for _ in 0..3 {
            apu.frame_step();
        }
        assert!(apu.interrupt_pending());
        assert_eq!(apu.peek_status() & 0x40, 0x40);
        assert_eq!(apu.read_status() & 0x40, 0x40);
        assert!(!apu.interrupt_pending());
        assert_eq!(apu.read_status() & 0x40, 0);
    }

    #[test]
    fn frame_mode_write_inhibits_interrupt() {
        let mut apu = reset_apu();
        apu.write(0x4017, 0x40);
        for _ in 0..12 {
            apu.frame_step();
        }
        assert!(!apu.interrupt_pending());
    }

    #[test]
    fn five_step_write_clocks_length_immediately() {
        let mut apu = reset_apu();
        assert_eq!(apu.pulse1.length.counter, 10);
        apu.write(0x4017, 0x80);
        assert_eq!(apu.pulse1.length.counter, 9);
        assert_eq!(apu.triangle.length.counter, 9);
    }

    #[test]
    fn registers_alias_across_io_pages() {
        let mut apu = Apu::new();
        apu.write(0x4102, 0x34);
        apu.write(0x4F03, 0x01);
        assert_eq!(apu.pulse1.timer.period, 0x134);
    }

    #[test]
    fn unknown_registers_are_ignored() {
        let mut apu = reset_apu();
        let before = apu.clone();
        for address in [0x4009, 0x400D, 0x4010, 0x4011, 0x4013, 0x4016, 0x4018, 0x40FF] {
            apu.write(address, 0xFF);
        }
        assert_eq!(apu, before);
    }

    #[test]
    fn triangle_half_frame_respects_control_flag() {
        let mut apu = reset_apu();
        apu.write(0x4008, 0x81);
        apu.write(0x400B, 0x08);
        apu.frame_step(); // step 1: quarter + half
        assert_eq!(apu.triangle.length.counter, 254);
        assert_eq!(apu.triangle.linear.counter, 1);
    }

    #[test]
    fn query_paths_resolve() {
        let apu = reset_apu();
        for path in apu.query_paths() {
            assert!(apu.query(path).is_some(), "{path} should resolve");
        }
        assert_eq!(apu.query("frame.mode"), Some(Value::U8(4)));
        assert_eq!(apu.query("status"), Some(Value::U8(0x0F)));
        assert_eq!(apu.query("nonsense"), None);
    }
}

//! Frame sequencer.
//!
//! Clocked at roughly 240 Hz by the owner of the APU. Each clock advances
//! one step and reports which of the quarter-frame (envelopes, linear
//! counter) and half-frame (length counters, sweeps) events fire.

/// Frame sequencer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameMode {
    /// 4-step: raises an interrupt on the terminal step.
    #[default]
    FourStep,
    /// 5-step: no interrupt; the terminal step is silent.
    FiveStep,
}

impl FrameMode {
    /// Number of steps in one sequence.
    #[must_use]
    pub const fn steps(self) -> u8 {
        match self {
            Self::FourStep => 4,
            Self::FiveStep => 5,
        }
    }
}

/// Events produced by one sequencer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameEvents {
    pub quarter: bool,
    pub half: bool,
}

/// Frame sequencer state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSequencer {
    pub mode: FrameMode,
    pub step: u8,
    pub irq_inhibit: bool,
    pub irq_pending: bool,
}

impl FrameSequencer {
    /// Handle a `$4017` write. Returns the events to fire immediately: in
    /// 5-step mode the write clocks one quarter and one half frame.
    pub fn write(&mut self, value: u8) -> FrameEvents {
        self.step = 0;
        let events = if value & 0x80 != 0 {
            self.mode = FrameMode::FiveStep;
            self.clock()
        } else {
            self.mode = FrameMode::FourStep;
            FrameEvents::default()
        };
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_pending = false;
        }
        events
    }

    /// Advance one step.
    pub fn clock(&mut self) -> FrameEvents {
        self.step += 1;
        if self.step == self.mode.steps() {
            self.step = 0;
        }
        let events = FrameEvents {
            quarter: self.step <= 3,
            half: self.step == 1 || self.step == 3,
        };
        if self.mode == FrameMode::FourStep && self.step == 3 && !self.irq_inhibit {
            self.irq_pending = true;
        }
        events
    }
}

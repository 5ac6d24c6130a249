//! Decimation from the CPU clock to the output sample rate.
//!
//! One raw sample is taken every `interval` cycles and passed through a
//! 4-tap trailing moving average before it reaches the output buffer.

use emu_core::Ticks;

pub const FILTER_TAPS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    interval: u64,
    counter: u64,
    history: [f32; FILTER_TAPS],
    cursor: usize,
    output: Vec<f32>,
}

impl Sampler {
    /// A zero interval samples every cycle.
    #[must_use]
    pub fn new(interval: Ticks) -> Self {
        Self {
            interval: interval.get(),
            counter: 0,
            history: [0.0; FILTER_TAPS],
            cursor: 0,
            output: Vec::new(),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Ticks {
        Ticks::new(self.interval)
    }

    /// Count one cycle. Returns true when a raw sample is due.
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.interval {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    /// Filter one raw sample into the output buffer.
    pub fn push(&mut self, raw: f32) {
        self.history[self.cursor] = raw;
        self.cursor = (self.cursor + 1) % FILTER_TAPS;
        let [a, b, c, d] = self.history;
        self.output.push(((a + b) + (c + d)) * 0.25);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.output.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Drain up to `count` samples from the front of the buffer.
    pub fn take(&mut self, count: usize) -> Vec<f32> {
        let count = count.min(self.output.len());
        self.output.drain(..count).collect()
    }

    /// Forget filter history, phase and buffered output.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.history = [0.0; FILTER_TAPS];
        self.cursor = 0;
        self.output.clear();
    }
}

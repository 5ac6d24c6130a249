//! Player configuration.

use crate::CPU_HZ;

/// Output rate used when the configured rate is zero.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default Init budget: four seconds of emulated CPU time.
pub const DEFAULT_INIT_CYCLE_LIMIT: u64 = 4 * CPU_HZ;

/// NSF player configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NsfConfig {
    /// Output sample rate in Hz. Zero selects [`DEFAULT_SAMPLE_RATE`].
    pub sample_rate: u32,
    /// Cycles the Init routine may run before the player gives up on it
    /// and starts playback from whatever state it reached.
    pub init_cycle_limit: u64,
}

impl NsfConfig {
    /// The sample rate the player will actually produce.
    #[must_use]
    pub const fn effective_sample_rate(&self) -> u32 {
        if self.sample_rate == 0 {
            DEFAULT_SAMPLE_RATE
        } else {
            self.sample_rate
        }
    }
}

impl Default for NsfConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            init_cycle_limit: DEFAULT_INIT_CYCLE_LIMIT,
        }
    }
}

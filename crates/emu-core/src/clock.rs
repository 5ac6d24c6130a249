//! Master clock configuration.

use crate::Ticks;

/// Master clock configuration for a system.
///
/// Each system has one clock that drives all timing. Components may run at
/// divided rates, but everything derives from this frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Clock frequency in Hz (e.g., `1_789_772` for the NTSC 2A03).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks between events recurring at `rate_hz` (integer division).
    ///
    /// The remainder is dropped, so periodic events drift against wall time
    /// exactly as a hardware divider chain would. A rate of zero yields zero.
    #[must_use]
    pub const fn ticks_per_period(&self, rate_hz: u64) -> Ticks {
        if rate_hz == 0 {
            return Ticks::ZERO;
        }
        Ticks::new(self.frequency_hz / rate_hz)
    }
}

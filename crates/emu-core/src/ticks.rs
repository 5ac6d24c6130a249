//! Cycle counts.

/// A count of machine cycles, as reported through the tick hook.
///
/// Divider periods (frame sequencer, sample interval) are carried in this
/// type so they cannot be mixed up with register values or sample counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

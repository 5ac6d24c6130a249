//! Trait for components that can be advanced by clock ticks.

use crate::Ticks;

/// A component that can be advanced by clock ticks.
///
/// This is the tick hook an execution engine calls back into: exactly once
/// per elapsed machine cycle, synchronously, before it executes anything
/// further.
pub trait Tickable {
    /// Advance the component by one machine cycle.
    ///
    /// Components track their own phase relative to the clock and perform
    /// work when appropriate (e.g., a unit running at half rate only does
    /// work on every other tick).
    fn tick(&mut self);

    /// Advance the component by multiple ticks.
    ///
    /// Default implementation calls `tick()` in a loop. Components may
    /// override for efficiency, but must produce identical results.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}

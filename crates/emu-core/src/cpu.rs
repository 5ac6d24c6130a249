//! Execution engine trait.

use crate::{Bus, Tickable};

/// Program counter value that marks a routine as finished.
///
/// Players enter Init and Play routines with a return address that lands
/// on `$0000`, so reaching it means the routine executed its final `RTS`.
pub const RETURN_SENTINEL: u16 = 0x0000;

/// An instruction execution engine.
///
/// The engine owns no audio or memory state. Everything it touches comes in
/// through the bus argument, which is also the tick hook: the engine must
/// call [`Tickable::tick`] exactly once per machine cycle it consumes, and
/// must not execute the next instruction until the hook has returned.
pub trait Cpu {
    /// Execute one instruction. Returns the number of cycles consumed.
    fn step<B: Bus + Tickable>(&mut self, bus: &mut B) -> u32;

    /// Execute until the program counter reaches [`RETURN_SENTINEL`].
    ///
    /// Unbounded: callers that cannot trust the program should loop over
    /// [`Cpu::step`] with their own budget instead.
    fn run<B: Bus + Tickable>(&mut self, bus: &mut B) {
        while self.pc() != RETURN_SENTINEL {
            self.step(bus);
        }
    }

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Jump to an entry point.
    fn set_pc(&mut self, pc: u16);

    /// Seed the accumulator (routine argument register).
    fn set_accumulator(&mut self, value: u8);

    /// Returns true if the interrupt-disable flag is set.
    fn interrupt_disabled(&self) -> bool;

    /// Take a maskable interrupt.
    fn interrupt<B: Bus + Tickable>(&mut self, bus: &mut B);
}

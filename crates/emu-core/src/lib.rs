//! Core traits and types for cycle-accurate emulation.
//!
//! An execution engine drives everything. It reaches memory through a
//! [`Bus`] and reports every elapsed machine cycle through [`Tickable`],
//! so audio hardware advances in lockstep with the program that pokes it.

mod bus;
mod clock;
mod cpu;
mod observable;
mod tickable;
mod ticks;

pub use bus::Bus;
pub use clock::MasterClock;
pub use cpu::{Cpu, RETURN_SENTINEL};
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;

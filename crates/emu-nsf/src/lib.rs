//! NSF player runtime.
//!
//! Loads an NSF tune into a 64 KiB address space with the 2A03 APU mapped at
//! `$4000–$4FFF`, drives its Init and Play routines through an
//! [`emu_core::Cpu`] engine, and turns the APU output into a mono sample
//! stream at the configured rate.
//!
//! The 6502 engine is supplied by the caller. It sees the address space and
//! the per-cycle tick hook as a single [`emu_core::Bus`] +
//! [`emu_core::Tickable`] value.

pub mod bus;
#[cfg(feature = "wav")]
pub mod capture;
pub mod config;
pub mod info;
pub mod memory;
pub mod player;
pub mod sampler;

pub use bus::NsfBus;
pub use config::NsfConfig;
pub use format_nsf::{NsfError, NsfFile, NsfHeader};
pub use info::SongInfo;
pub use memory::MemoryImage;
pub use player::Nsf;
pub use sampler::Sampler;

/// NTSC CPU clock: 236.25 MHz / 11 / 12, truncated to whole hertz.
pub const CPU_HZ: u64 = 236_250_000 / 11 / 12;

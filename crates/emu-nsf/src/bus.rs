//! The bus an execution engine drives during playback.
//!
//! `NsfBus` is both the memory interface and the tick hook: the engine
//! calls [`Tickable::tick`] once per cycle it consumes, and each tick
//! steps the APU, the 240 Hz frame sequencer divider and the sampler.

use emu_core::{Bus, Tickable, Ticks};
use ricoh_apu_2a03::Apu;

use crate::memory::MemoryImage;
use crate::sampler::Sampler;

pub struct NsfBus {
    memory: MemoryImage,
    sampler: Sampler,
    /// Cycles between frame sequencer steps.
    frame_period: u64,
    frame_ticks: u64,
    cycles: u64,
}

impl NsfBus {
    #[must_use]
    pub fn new(memory: MemoryImage, frame_period: Ticks, sample_interval: Ticks) -> Self {
        Self {
            memory,
            sampler: Sampler::new(sample_interval),
            frame_period: frame_period.get(),
            frame_ticks: 0,
            cycles: 0,
        }
    }

    /// Start a fresh playback session: APU power-up sequence, empty
    /// sampler, frame divider and cycle count at zero. Memory is untouched.
    pub fn reset(&mut self) {
        self.memory.apu_mut().reset();
        self.sampler.reset();
        self.frame_ticks = 0;
        self.cycles = 0;
    }

    /// Total cycles ticked since the last reset.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn memory(&self) -> &MemoryImage {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryImage {
        &mut self.memory
    }

    #[must_use]
    pub fn apu(&self) -> &Apu {
        self.memory.apu()
    }

    #[must_use]
    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut Sampler {
        &mut self.sampler
    }
}

impl Bus for NsfBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory.write(address, value);
    }
}

impl Tickable for NsfBus {
    fn tick(&mut self) {
        let apu = self.memory.apu_mut();
        apu.step();
        self.cycles += 1;

        self.frame_ticks += 1;
        if self.frame_ticks == self.frame_period {
            self.frame_ticks = 0;
            apu.frame_step();
        }

        if self.sampler.tick() {
            self.sampler.push(apu.output());
        }
    }
}

/// Memory access with the tick hook detached.
///
/// The Init routine runs against this: its writes reach the APU registers,
/// but no cycles elapse for the APU, the frame sequencer or the sampler.
pub(crate) struct InitBus<'a>(pub(crate) &'a mut MemoryImage);

impl Bus for InitBus<'_> {
    fn read(&mut self, address: u16) -> u8 {
        self.0.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.0.write(address, value);
    }
}

impl Tickable for InitBus<'_> {
    fn tick(&mut self) {}
}

//! NSF player: runs a tune's Init and Play routines on an execution engine
//! and collects the APU output.
//!
//! Playback follows the standard NSF driver protocol:
//!
//! 1. Selecting a track resets the APU, clears work RAM, reloads the program
//!    image and runs Init with the zero-based track index in A.
//! 2. Each play call jumps to the Play routine and steps the engine until it
//!    returns to `$0000`.
//! 3. The remaining cycles of the play period (the header's NTSC speed) are
//!    ticked idle so envelopes, sweeps and sampling carry on between calls.
//!
//! The engine reports every cycle through the bus tick hook, so the APU
//! advances in lockstep with the program.

#[cfg(feature = "wav")]
use std::path::Path;

use emu_core::{Cpu, MasterClock, Observable, RETURN_SENTINEL, Tickable, Value};
use format_nsf::{NsfError, NsfFile, NsfHeader};
use log::{debug, warn};
use ricoh_apu_2a03::Apu;

use crate::CPU_HZ;
use crate::bus::{InitBus, NsfBus};
use crate::config::NsfConfig;
use crate::info::SongInfo;
use crate::memory::MemoryImage;

/// Frame sequencer rate.
const FRAME_RATE_HZ: u64 = 240;

/// Convert a play period in microseconds to CPU cycles.
///
/// The cycle length is truncated to whole nanoseconds first (558 ns), so
/// the result runs slightly fast against wall time.
#[must_use]
pub fn ticks_per_play(speed_us: u16) -> u64 {
    const NS_PER_CYCLE: u64 = 1_000_000_000 / CPU_HZ;
    u64::from(speed_us) * 1000 / NS_PER_CYCLE
}

/// An NSF tune loaded into an emulated address space.
pub struct Nsf<C: Cpu> {
    file: NsfFile,
    cpu: C,
    bus: NsfBus,
    config: NsfConfig,
    ticks_per_play: u64,
    current_song: Option<u8>,
}

impl<C: Cpu> Nsf<C> {
    /// Parse `data` and load it. Fails before anything is built if the
    /// header is malformed.
    pub fn new(data: &[u8], cpu: C, config: NsfConfig) -> Result<Self, NsfError> {
        let file = NsfFile::parse(data)?;
        Ok(Self::from_file(file, cpu, config))
    }

    #[must_use]
    pub fn from_file(file: NsfFile, cpu: C, config: NsfConfig) -> Self {
        let clock = MasterClock::new(CPU_HZ);
        let sample_rate = config.effective_sample_rate();

        let mut memory = MemoryImage::new();
        memory.load(file.header().load_address, file.program());
        let bus = NsfBus::new(
            memory,
            clock.ticks_per_period(FRAME_RATE_HZ),
            clock.ticks_per_period(u64::from(sample_rate)),
        );
        let ticks_per_play = ticks_per_play(file.header().ntsc_speed);

        Self {
            file,
            cpu,
            bus,
            config,
            ticks_per_play,
            current_song: None,
        }
    }

    #[must_use]
    pub fn header(&self) -> &NsfHeader {
        self.file.header()
    }

    /// The active track (1-based), if one has been selected.
    #[must_use]
    pub fn current_song(&self) -> Option<u8> {
        self.current_song
    }

    /// Make `song` (1-based) the active track, running its Init routine.
    /// Selecting the active track again does nothing.
    ///
    /// Indices outside the header's song count are passed to Init as-is;
    /// what the tune does with them is up to the tune.
    pub fn select_track(&mut self, song: u8) {
        if self.current_song == Some(song) {
            return;
        }
        let header = self.file.header();
        debug!(
            "NSF: selecting song {song}/{} (init ${:04X})",
            header.song_count, header.init_address
        );

        self.bus.reset();
        let memory = self.bus.memory_mut();
        memory.clear_work_ram();
        memory.load(header.load_address, self.file.program());

        self.cpu.set_accumulator(song.wrapping_sub(1));
        self.cpu.set_pc(header.init_address);
        let mut init_bus = InitBus(memory);
        let mut spent = 0u64;
        while self.cpu.pc() != RETURN_SENTINEL {
            if spent >= self.config.init_cycle_limit {
                warn!(
                    "NSF: init for song {song} still running at ${:04X} after {spent} cycles; starting playback anyway",
                    self.cpu.pc()
                );
                break;
            }
            spent += u64::from(self.cpu.step(&mut init_bus).max(1));
        }

        self.current_song = Some(song);
    }

    /// Render `count` samples of the active track, selecting the header's
    /// starting song first if no track is active.
    pub fn play(&mut self, count: usize) -> Vec<f32> {
        if self.current_song.is_none() {
            self.select_track(self.file.header().starting_song.max(1));
        }

        let play_address = self.file.header().play_address;
        while self.bus.sampler().len() < count {
            let start = self.bus.cycles();
            self.cpu.set_pc(play_address);
            while self.cpu.pc() != RETURN_SENTINEL && self.bus.sampler().len() < count {
                self.step();
            }

            let elapsed = self.bus.cycles() - start;
            let mut idle = self.ticks_per_play.saturating_sub(elapsed);
            if elapsed == 0 && idle == 0 {
                // Zero-length play period with an empty Play routine.
                idle = 1;
            }
            while idle > 0 && self.bus.sampler().len() < count {
                self.bus.tick();
                idle -= 1;
            }
        }
        self.bus.sampler_mut().take(count)
    }

    /// Render `count` samples of the active track and write them to a WAV
    /// file at the player's sample rate.
    #[cfg(feature = "wav")]
    pub fn render_to_wav(&mut self, count: usize, path: &Path) -> Result<(), hound::Error> {
        let samples = self.play(count);
        crate::capture::save_audio(&samples, self.sample_rate(), path)
    }

    /// Execute one instruction, then take the frame interrupt if it is
    /// pending and the engine has interrupts enabled.
    fn step(&mut self) {
        self.cpu.step(&mut self.bus);
        if !self.cpu.interrupt_disabled() && self.bus.apu().interrupt_pending() {
            self.cpu.interrupt(&mut self.bus);
        }
    }

    /// Advance one CPU cycle without executing anything.
    pub fn tick(&mut self) {
        self.bus.tick();
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.config.effective_sample_rate()
    }

    /// CPU cycles per play call.
    #[must_use]
    pub fn ticks_per_play(&self) -> u64 {
        self.ticks_per_play
    }

    /// Cycles elapsed in the current session.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.bus.cycles()
    }

    #[must_use]
    pub fn apu(&self) -> &Apu {
        self.bus.apu()
    }

    #[must_use]
    pub fn memory(&self) -> &MemoryImage {
        self.bus.memory()
    }

    #[must_use]
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    #[must_use]
    pub fn track_info(&self, track: u8) -> SongInfo {
        SongInfo::new(self.file.header(), track, self.sample_rate())
    }

    /// One entry per declared song, in track order.
    #[must_use]
    pub fn songs(&self) -> Vec<SongInfo> {
        (1..=self.file.header().song_count)
            .map(|track| self.track_info(track))
            .collect()
    }
}

impl<C: Cpu> Observable for Nsf<C> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("apu.") {
            self.apu().query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let addr = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix('$'))
            {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            addr.map(|a| Value::U8(self.memory().peek(a)))
        } else {
            match path {
                "song" => Some(self.current_song.unwrap_or(0).into()),
                "sample_rate" => Some(self.sample_rate().into()),
                "ticks_per_play" => Some(self.ticks_per_play.into()),
                "cycles" => Some(self.cycles().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "song",
            "sample_rate",
            "ticks_per_play",
            "cycles",
            "apu.<apu_paths>",
            "memory.<address>",
        ]
    }
}

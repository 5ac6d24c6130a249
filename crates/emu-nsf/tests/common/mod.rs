//! Test support: a scripted 6502 subset and an NSF image builder.
//!
//! The engine knows just enough opcodes to write APU registers, spin, and
//! return. It ticks the bus once per cycle after executing, and treats an
//! RTS with nothing pushed as a return to the `$0000` sentinel.

#![allow(dead_code)]

use emu_core::{Bus, Cpu, RETURN_SENTINEL, Tickable};

pub const LOAD_ADDRESS: u16 = 0x8000;
pub const INIT_ADDRESS: u16 = 0x8000;
pub const PLAY_ADDRESS: u16 = 0x8100;

/// NTSC 60 Hz play rate.
pub const NTSC_SPEED: u16 = 16_639;

pub struct ScriptCpu {
    pub pc: u16,
    pub a: u8,
    pub interrupt_disable: bool,
    /// Instructions executed.
    pub steps: u64,
    /// Interrupts taken.
    pub interrupts: u32,
    stack: Vec<u16>,
}

impl ScriptCpu {
    pub fn new() -> Self {
        Self {
            pc: 0,
            a: 0,
            interrupt_disable: true,
            steps: 0,
            interrupts: 0,
            stack: Vec::new(),
        }
    }

    fn fetch<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch(bus);
        let hi = self.fetch(bus);
        u16::from_le_bytes([lo, hi])
    }
}

impl Cpu for ScriptCpu {
    fn step<B: Bus + Tickable>(&mut self, bus: &mut B) -> u32 {
        self.steps += 1;
        let opcode = self.fetch(bus);
        let cycles = match opcode {
            // LDA #imm
            0xA9 => {
                self.a = self.fetch(bus);
                2
            }
            // LDA abs
            0xAD => {
                let address = self.fetch_word(bus);
                self.a = bus.read(address);
                4
            }
            // STA abs
            0x8D => {
                let address = self.fetch_word(bus);
                bus.write(address, self.a);
                4
            }
            // JMP abs
            0x4C => {
                self.pc = self.fetch_word(bus);
                3
            }
            // JSR abs
            0x20 => {
                let target = self.fetch_word(bus);
                self.stack.push(self.pc);
                self.pc = target;
                6
            }
            // RTS
            0x60 => {
                self.pc = self.stack.pop().unwrap_or(RETURN_SENTINEL);
                6
            }
            // RTI
            0x40 => {
                self.pc = self.stack.pop().unwrap_or(RETURN_SENTINEL);
                self.interrupt_disable = false;
                6
            }
            // SEI / CLI / NOP
            0x78 => {
                self.interrupt_disable = true;
                2
            }
            0x58 => {
                self.interrupt_disable = false;
                2
            }
            0xEA => 2,
            other => panic!(
                "unscripted opcode ${other:02X} at ${:04X}",
                self.pc.wrapping_sub(1)
            ),
        };
        for _ in 0..cycles {
            bus.tick();
        }
        cycles
    }

    fn pc(&self) -> u16 {
        self.pc
    }

    fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    fn set_accumulator(&mut self, value: u8) {
        self.a = value;
    }

    fn interrupt_disabled(&self) -> bool {
        self.interrupt_disable
    }

    fn interrupt<B: Bus + Tickable>(&mut self, bus: &mut B) {
        self.interrupts += 1;
        self.stack.push(self.pc);
        self.interrupt_disable = true;
        self.pc = u16::from_le_bytes([bus.read(0xFFFE), bus.read(0xFFFF)]);
        for _ in 0..7 {
            bus.tick();
        }
    }
}

/// Build an NSF with Init at `$8000` and Play at `$8100`.
pub fn build_nsf(songs: u8, starting_song: u8, init: &[u8], play: &[u8]) -> Vec<u8> {
    let mut data = vec![0u8; 0x80];
    data[0..5].copy_from_slice(b"NESM\x1A");
    data[0x05] = 1;
    data[0x06] = songs;
    data[0x07] = starting_song;
    data[0x08..0x0A].copy_from_slice(&LOAD_ADDRESS.to_le_bytes());
    data[0x0A..0x0C].copy_from_slice(&INIT_ADDRESS.to_le_bytes());
    data[0x0C..0x0E].copy_from_slice(&PLAY_ADDRESS.to_le_bytes());
    data[0x0E..0x0E + 10].copy_from_slice(b"Test Tune\0");
    data[0x2E..0x2E + 7].copy_from_slice(b"Tester\0");
    data[0x6E..0x70].copy_from_slice(&NTSC_SPEED.to_le_bytes());

    let mut program = vec![0xEA; 0x200];
    program[..init.len()].copy_from_slice(init);
    let play_offset = usize::from(PLAY_ADDRESS - LOAD_ADDRESS);
    program[play_offset..play_offset + play.len()].copy_from_slice(play);
    data.extend_from_slice(&program);
    data
}

/// Play routine that spins forever: `JMP $8100`.
pub const SPIN: &[u8] = &[0x4C, 0x00, 0x81];

/// Routine that returns immediately.
pub const RETURN: &[u8] = &[0x60];

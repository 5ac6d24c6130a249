//! 64 KiB address space with the APU mapped into it.
//!
//! Every address is plain RAM. Writes to `$4000–$4FFF` are stored and then
//! forwarded to the APU register decoder; reads of `$4015` are computed from
//! channel state instead of returning the stored byte.

use emu_core::Bus;
use ricoh_apu_2a03::{Apu, STATUS_REGISTER};

pub const MEMORY_SIZE: usize = 0x1_0000;

/// Last byte of the 2 KiB work RAM cleared between tracks.
pub const WORK_RAM_END: usize = 0x07FF;

pub struct MemoryImage {
    bytes: Box<[u8]>,
    apu: Apu,
}

impl MemoryImage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MEMORY_SIZE].into_boxed_slice(),
            apu: Apu::new(),
        }
    }

    /// Copy a program image to `address`. Bytes past `$FFFF` are dropped.
    /// The APU does not see these writes.
    pub fn load(&mut self, address: u16, image: &[u8]) {
        let start = usize::from(address);
        let len = image.len().min(MEMORY_SIZE - start);
        self.bytes[start..start + len].copy_from_slice(&image[..len]);
    }

    /// Zero `$0000–$07FF`.
    pub fn clear_work_ram(&mut self) {
        self.bytes[..=WORK_RAM_END].fill(0);
    }

    /// Read without side effects. `$4015` reports APU status but leaves the
    /// frame interrupt pending.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        if address == STATUS_REGISTER {
            self.apu.peek_status()
        } else {
            self.bytes[usize::from(address)]
        }
    }

    #[must_use]
    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for MemoryImage {
    fn read(&mut self, address: u16) -> u8 {
        if address == STATUS_REGISTER {
            self.apu.read_status()
        } else {
            self.bytes[usize::from(address)]
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        self.bytes[usize::from(address)] = value;
        if address & 0xF000 == 0x4000 {
            self.apu.write(address, value);
        }
    }
}

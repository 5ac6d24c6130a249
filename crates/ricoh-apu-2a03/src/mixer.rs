//! Non-linear output mixer.
//!
//! The 2A03 sums its channels through a resistor network, so loudness is
//! not linear in channel level. Both lookup tables come from the nesdev
//! approximations of that network and are built once per process.

use std::sync::LazyLock;

/// Pulse table size: pulse1 + pulse2 levels, 0–30.
pub const PULSE_TABLE_LEN: usize = 31;

/// Triangle/noise table size: 3 × triangle + 2 × noise (+ DMC headroom).
pub const TND_TABLE_LEN: usize = 203;

static PULSE_TABLE: LazyLock<[f32; PULSE_TABLE_LEN]> = LazyLock::new(|| {
    let mut table = [0.0; PULSE_TABLE_LEN];
    for (i, entry) in table.iter_mut().enumerate().skip(1) {
        *entry = 95.88 / (8128.0 / i as f32 + 100.0);
    }
    table
});

static TND_TABLE: LazyLock<[f32; TND_TABLE_LEN]> = LazyLock::new(|| {
    let mut table = [0.0; TND_TABLE_LEN];
    for (i, entry) in table.iter_mut().enumerate().skip(1) {
        *entry = 163.67 / (24329.0 / i as f32 + 100.0);
    }
    table
});

/// `pulse_table[i] = 95.88 / (8128 / i + 100)`, `pulse_table[0] = 0`.
#[must_use]
pub fn pulse_table() -> &'static [f32; PULSE_TABLE_LEN] {
    &PULSE_TABLE
}

/// `tnd_table[i] = 163.67 / (24329 / i + 100)`, `tnd_table[0] = 0`.
#[must_use]
pub fn tnd_table() -> &'static [f32; TND_TABLE_LEN] {
    &TND_TABLE
}

/// Mix four channel levels (each 0–15) into one sample.
#[must_use]
pub fn mix(pulse1: u8, pulse2: u8, triangle: u8, noise: u8) -> f32 {
    let pulse = usize::from(pulse1) + usize::from(pulse2);
    let tnd = 3 * usize::from(triangle) + 2 * usize::from(noise);
    PULSE_TABLE[pulse] + TND_TABLE[tnd]
}

//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// Execution engines access memory and memory-mapped registers through this
/// trait. The bus handles address decoding and routing to the appropriate
/// device.
pub trait Bus {
    /// Read a byte from the given address.
    ///
    /// Takes `&mut self` because some registers change state when read
    /// (e.g. reading the APU status register acknowledges its interrupt).
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

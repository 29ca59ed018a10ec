//! Memory bus contract, address map, and the flat system bus.

/// Flat 64 KiB bus with interrupt, timer and joypad registers decoded.
pub mod bus;
/// Fixed memory-region map and address decoder.
pub mod map;

pub use bus::SystemBus;
pub use map::{
    decode_memory_region, echo_target, MemoryRegion, RegionDescriptor, DIV_ADDR,
    FIXED_MEMORY_REGIONS, IE_ADDR, IF_ADDR, IO_END, IO_START, P1_ADDR, ROM_END, ROM_START,
    TAC_ADDR, TIMA_ADDR, TMA_ADDR,
};

use crate::InterruptRegisters;

/// Size in bytes of the flat address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;

/// Allocates a zeroed 64 KiB backing store.
#[must_use]
pub fn new_address_space() -> Box<[u8]> {
    vec![0; ADDRESS_SPACE_BYTES].into_boxed_slice()
}

/// Byte-addressed bus shared by the CPU and every interrupt producer.
///
/// All access happens on the thread that drives [`crate::Cpu::step`].
pub trait MemoryBus {
    /// Reads one byte. Reads may have device side effects.
    fn read_byte(&mut self, addr: u16) -> u8;

    /// Writes one byte.
    fn write_byte(&mut self, addr: u16, value: u8);

    /// Borrows the `IF`/`IE` register bank.
    fn interrupts(&self) -> &InterruptRegisters;

    /// Mutably borrows the `IF`/`IE` register bank.
    fn interrupts_mut(&mut self) -> &mut InterruptRegisters;

    /// Notifies the attached timer that `machine_cycles` elapsed.
    ///
    /// Buses without a timer keep the default, which does nothing.
    fn step_timer(&mut self, _machine_cycles: u32) {}
}

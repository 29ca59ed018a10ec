//! Instruction-execution and interrupt-delivery core for a Game Boy class
//! CPU emulator.

/// Error types for snapshots, cartridge loading and target parsing.
pub mod error;
pub use error::{ParseTargetError, RomLoadError, SnapshotError};

/// Hardware target selection and cartridge header inspection.
pub mod target;
pub use target::Target;

/// Machine-cycle cost table and clock conversion helpers.
pub mod timing;
pub use timing::{
    cycle_cost, machine_cycles_to_ticks, CycleCostKind, CLOCK_TICKS_PER_MACHINE_CYCLE,
    CYCLE_COST_TABLE, TICKS_PER_FRAME,
};

/// Register file with aliased 8-bit and 16-bit views.
pub mod state;
pub use state::{
    Reg16, Reg8, Registers, F_FLAGS_MASK, REGISTER_SNAPSHOT_BYTES, REGISTER_SNAPSHOT_VERSION,
    REGISTER_STORAGE_BYTES,
};

/// Interrupt sources, `IF`/`IE` registers and the priority dispatch table.
pub mod interrupt;
pub use interrupt::{
    Interrupt, InterruptDispatchTable, InterruptRegisters, DISPATCH_TABLE_LEN,
    INTERRUPT_DISPATCH_TABLE, INTERRUPT_LINES_MASK,
};

/// Memory bus contract and the flat system bus.
pub mod memory;
pub use memory::{
    decode_memory_region, new_address_space, MemoryBus, MemoryRegion, RegionDescriptor,
    SystemBus, ADDRESS_SPACE_BYTES, FIXED_MEMORY_REGIONS,
};

/// Timer and joypad devices that raise interrupt requests.
pub mod peripherals;
pub use peripherals::{Button, Joypad, Timer, TAC_ENABLE};

/// Opcode table and the control-flow instruction handlers.
pub mod instructions;
pub use instructions::{InstructionSet, OpHandler, OpcodeTable};

/// Host-facing configuration, trace hooks and run-loop types.
pub mod api;
pub use api::{CoreConfig, RunBoundary, RunOutcome, TraceEvent, TraceSink};

/// CPU core step loop.
pub mod cpu;
pub use cpu::Cpu;

/// Whole-machine driver.
pub mod machine;
pub use machine::GameBoy;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;

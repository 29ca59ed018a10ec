/// Clock ticks per machine cycle at normal speed.
pub const CLOCK_TICKS_PER_MACHINE_CYCLE: u32 = 4;

/// Clock ticks in one video frame (154 lines of 456 ticks).
pub const TICKS_PER_FRAME: u32 = 70_224;

/// Converts a machine-cycle count into clock ticks.
#[must_use]
pub const fn machine_cycles_to_ticks(machine_cycles: u32) -> u32 {
    machine_cycles * CLOCK_TICKS_PER_MACHINE_CYCLE
}

/// Instruction and delivery forms with fixed machine-cycle costs in the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleCostKind {
    /// `NOP`.
    Nop,
    /// `HALT` itself, on the step that enters low-power mode.
    Halt,
    /// One idle step while halted.
    HaltIdle,
    /// `DI`.
    Di,
    /// `EI`.
    Ei,
    /// `JP a16`.
    Jump,
    /// `RET`.
    Ret,
    /// `RETI`.
    Reti,
    /// `RST n`, also used for interrupt vector entry.
    Rst,
}

/// Single source-of-truth machine-cycle cost table.
pub const CYCLE_COST_TABLE: &[(CycleCostKind, u8)] = &[
    (CycleCostKind::Nop, 1),
    (CycleCostKind::Halt, 1),
    (CycleCostKind::HaltIdle, 1),
    (CycleCostKind::Di, 1),
    (CycleCostKind::Ei, 1),
    (CycleCostKind::Jump, 4),
    (CycleCostKind::Ret, 4),
    (CycleCostKind::Reti, 4),
    (CycleCostKind::Rst, 4),
];

/// Looks up the machine-cycle cost for a cycle-cost kind.
#[must_use]
pub fn cycle_cost(kind: CycleCostKind) -> Option<u8> {
    CYCLE_COST_TABLE
        .iter()
        .find_map(|(entry_kind, cycles)| (*entry_kind == kind).then_some(*cycles))
}

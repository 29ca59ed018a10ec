//! Instruction dispatch unit.
//!
//! Handlers execute one opcode and record their own machine-cycle cost in the
//! register file's `M` slot. The CPU core reads and clears that slot.

use std::fmt;

use crate::timing::{cycle_cost, CycleCostKind};
use crate::{MemoryBus, Registers};

/// Number of single-byte opcodes.
pub const OPCODE_COUNT: usize = 256;

/// `NOP`.
pub const OP_NOP: u8 = 0x00;
/// `HALT`.
pub const OP_HALT: u8 = 0x76;
/// `JP a16`.
pub const OP_JP_A16: u8 = 0xC3;
/// `RET`.
pub const OP_RET: u8 = 0xC9;
/// `RETI`.
pub const OP_RETI: u8 = 0xD9;
/// `DI`.
pub const OP_DI: u8 = 0xF3;
/// `EI`.
pub const OP_EI: u8 = 0xFB;

/// `RST n` opcodes paired with their restart addresses.
pub const RST_OPCODES: [(u8, u16); 8] = [
    (0xC7, 0x0000),
    (0xCF, 0x0008),
    (0xD7, 0x0010),
    (0xDF, 0x0018),
    (0xE7, 0x0020),
    (0xEF, 0x0028),
    (0xF7, 0x0030),
    (0xFF, 0x0038),
];

/// Opcode handler. Must record its machine-cycle cost with [`Registers::set_m`].
pub type OpHandler = fn(&mut Registers, &mut dyn MemoryBus);

/// Executes decoded opcodes on behalf of the CPU core.
pub trait InstructionSet {
    /// Executes `opcode` against `regs` and `bus`.
    ///
    /// `PC` already points past the opcode byte.
    ///
    /// # Panics
    ///
    /// Implementations panic when `opcode` has no semantics installed.
    fn dispatch(&self, opcode: u8, regs: &mut Registers, bus: &mut dyn MemoryBus);
}

/// 256-entry opcode handler table.
#[derive(Clone)]
pub struct OpcodeTable {
    handlers: [Option<OpHandler>; OPCODE_COUNT],
}

impl fmt::Debug for OpcodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let installed = self.handlers.iter().filter(|slot| slot.is_some()).count();
        f.debug_struct("OpcodeTable")
            .field("installed", &installed)
            .finish()
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::control()
    }
}

impl OpcodeTable {
    /// Creates a table with no handlers installed.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            handlers: [None; OPCODE_COUNT],
        }
    }

    /// Creates a table holding the control-flow opcodes the core interacts
    /// with: `NOP`, `HALT`, `DI`, `EI`, `JP a16`, `RET`, `RETI` and `RST n`.
    #[must_use]
    pub fn control() -> Self {
        let mut table = Self::empty();
        table.install(OP_NOP, nop);
        table.install(OP_HALT, halt);
        table.install(OP_JP_A16, jp_a16);
        table.install(OP_RET, ret);
        table.install(OP_RETI, reti);
        table.install(OP_DI, di);
        table.install(OP_EI, ei);

        table.install(0xC7, rst_n::<0x0000>);
        table.install(0xCF, rst_n::<0x0008>);
        table.install(0xD7, rst_n::<0x0010>);
        table.install(0xDF, rst_n::<0x0018>);
        table.install(0xE7, rst_n::<0x0020>);
        table.install(0xEF, rst_n::<0x0028>);
        table.install(0xF7, rst_n::<0x0030>);
        table.install(0xFF, rst_n::<0x0038>);
        table
    }

    /// Installs `handler` for `opcode`, returning the handler it replaces.
    pub fn install(&mut self, opcode: u8, handler: OpHandler) -> Option<OpHandler> {
        self.handlers[usize::from(opcode)].replace(handler)
    }

    /// Handler installed for `opcode`.
    #[must_use]
    pub const fn handler(&self, opcode: u8) -> Option<OpHandler> {
        self.handlers[opcode as usize]
    }

    /// Opcodes with no handler, in ascending order.
    pub fn unassigned(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |opcode| self.handlers[usize::from(*opcode)].is_none())
    }

    /// Installs `handler` for every opcode that has none.
    pub fn fill_unassigned(&mut self, handler: OpHandler) {
        for slot in self.handlers.iter_mut().filter(|slot| slot.is_none()) {
            *slot = Some(handler);
        }
    }
}

impl InstructionSet for OpcodeTable {
    fn dispatch(&self, opcode: u8, regs: &mut Registers, bus: &mut dyn MemoryBus) {
        let Some(handler) = self.handlers[usize::from(opcode)] else {
            panic!(
                "no handler installed for opcode {opcode:#04x} at pc {:#06x}",
                regs.pc().wrapping_sub(1)
            );
        };
        handler(regs, bus);
    }
}

fn cycles(kind: CycleCostKind) -> u8 {
    cycle_cost(kind).unwrap_or(1)
}

fn push_word(value: u16, regs: &mut Registers, bus: &mut dyn MemoryBus) {
    let [hi, lo] = value.to_be_bytes();
    let sp = regs.sp().wrapping_sub(1);
    bus.write_byte(sp, hi);
    let sp = sp.wrapping_sub(1);
    bus.write_byte(sp, lo);
    regs.set_sp(sp);
}

fn pop_word(regs: &mut Registers, bus: &mut dyn MemoryBus) -> u16 {
    let sp = regs.sp();
    let lo = bus.read_byte(sp);
    let hi = bus.read_byte(sp.wrapping_add(1));
    regs.set_sp(sp.wrapping_add(2));
    u16::from_le_bytes([lo, hi])
}

/// Restart routine: pushes `PC` and jumps to `vector`.
///
/// Interrupt delivery enters its vector through this routine, so the cost it
/// records is the delivery cost.
pub fn rst(vector: u16, regs: &mut Registers, bus: &mut dyn MemoryBus) {
    push_word(regs.pc(), regs, bus);
    regs.set_pc(vector);
    regs.set_m(cycles(CycleCostKind::Rst));
}

/// `RST n` with the restart address fixed at compile time.
pub fn rst_n<const VECTOR: u16>(regs: &mut Registers, bus: &mut dyn MemoryBus) {
    rst(VECTOR, regs, bus);
}

/// `NOP`.
pub fn nop(regs: &mut Registers, _bus: &mut dyn MemoryBus) {
    regs.set_m(cycles(CycleCostKind::Nop));
}

/// `HALT`: enters low-power mode until an interrupt is delivered.
pub fn halt(regs: &mut Registers, _bus: &mut dyn MemoryBus) {
    regs.set_halt(true);
    regs.set_m(cycles(CycleCostKind::Halt));
}

/// `DI`.
pub fn di(regs: &mut Registers, _bus: &mut dyn MemoryBus) {
    regs.set_ime(false);
    regs.set_m(cycles(CycleCostKind::Di));
}

/// `EI`. Takes effect immediately.
pub fn ei(regs: &mut Registers, _bus: &mut dyn MemoryBus) {
    regs.set_ime(true);
    regs.set_m(cycles(CycleCostKind::Ei));
}

/// `JP a16`: little-endian absolute jump.
pub fn jp_a16(regs: &mut Registers, bus: &mut dyn MemoryBus) {
    let lo = bus.read_byte(regs.bump());
    let hi = bus.read_byte(regs.bump());
    regs.set_pc(u16::from_le_bytes([lo, hi]));
    regs.set_m(cycles(CycleCostKind::Jump));
}

/// `RET`.
pub fn ret(regs: &mut Registers, bus: &mut dyn MemoryBus) {
    let target = pop_word(regs, bus);
    regs.set_pc(target);
    regs.set_m(cycles(CycleCostKind::Ret));
}

/// `RETI`: returns and re-enables interrupts.
pub fn reti(regs: &mut Registers, bus: &mut dyn MemoryBus) {
    let target = pop_word(regs, bus);
    regs.set_pc(target);
    regs.set_ime(true);
    regs.set_m(cycles(CycleCostKind::Reti));
}

//! CPU core: one execution step, halt idling, interrupt check-and-deliver and
//! tick accounting.

use std::io::{Read, Write};

use crate::timing::{cycle_cost, machine_cycles_to_ticks, CycleCostKind};
use crate::{
    CoreConfig, InstructionSet, MemoryBus, OpcodeTable, Registers, SnapshotError, TraceEvent,
    TraceSink, INTERRUPT_DISPATCH_TABLE,
};

/// Processor core driving an [`InstructionSet`] over a [`MemoryBus`].
///
/// The bus is passed to every step rather than owned, so the same bus can be
/// shared with the interrupt producers between steps.
#[derive(Debug, Clone)]
pub struct Cpu<I: InstructionSet = OpcodeTable> {
    regs: Registers,
    ticks: u64,
    instructions: I,
    config: CoreConfig,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl Cpu {
    /// Creates a core in the post-boot state with the control opcode table.
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        Self::with_instructions(OpcodeTable::control(), config)
    }
}

impl<I: InstructionSet> Cpu<I> {
    /// Creates a core in the post-boot state for `config.target`.
    #[must_use]
    pub fn with_instructions(instructions: I, config: CoreConfig) -> Self {
        Self {
            regs: Registers::power_on(config.target),
            ticks: 0,
            instructions,
            config,
        }
    }

    /// Runs one step and returns the clock ticks it consumed.
    ///
    /// A step fetches and dispatches one opcode, or idles for one machine
    /// cycle while halted. When `ime` is set and `IF & IE` is non-zero the
    /// highest-priority source is then delivered and its cost added. The
    /// attached timer is told the step's machine-cycle count.
    ///
    /// # Panics
    ///
    /// Panics when the fetched opcode has no handler installed.
    pub fn step(&mut self, bus: &mut dyn MemoryBus) -> u32 {
        self.execute_step(bus, None)
    }

    /// Like [`Self::step`], reporting trace events to `sink` when
    /// [`CoreConfig::tracing_enabled`] is set.
    ///
    /// # Panics
    ///
    /// Panics when the fetched opcode has no handler installed.
    pub fn step_traced(&mut self, bus: &mut dyn MemoryBus, sink: &mut dyn TraceSink) -> u32 {
        let sink = self.config.tracing_enabled.then_some(sink);
        self.execute_step(bus, sink)
    }

    fn execute_step(
        &mut self,
        bus: &mut dyn MemoryBus,
        mut sink: Option<&mut dyn TraceSink>,
    ) -> u32 {
        if self.regs.halt() {
            emit(&mut sink, TraceEvent::HaltIdle { pc: self.regs.pc() });
            self.regs.set_m(cycle_cost(CycleCostKind::HaltIdle).unwrap_or(1));
        } else {
            let pc = self.regs.bump();
            let opcode = bus.read_byte(pc);
            emit(&mut sink, TraceEvent::InstructionStart { pc, opcode });
            self.instructions.dispatch(opcode, &mut self.regs, bus);
        }

        let mut machine_cycles = u32::from(self.regs.m());
        self.regs.set_m(0);

        if self.regs.ime() {
            let vector = bus.interrupts().pending();
            if let Some(source) = INTERRUPT_DISPATCH_TABLE.deliver(vector, &mut self.regs, bus) {
                emit(
                    &mut sink,
                    TraceEvent::InterruptDelivered {
                        source,
                        vector: source.vector(),
                    },
                );
                machine_cycles += u32::from(self.regs.m());
                self.regs.set_m(0);
            }
        }

        let ticks = machine_cycles_to_ticks(machine_cycles);
        self.ticks += u64::from(ticks);
        bus.step_timer(machine_cycles);

        emit(
            &mut sink,
            TraceEvent::StepRetired {
                ticks,
                total_ticks: self.ticks,
            },
        );
        ticks
    }

    /// Zeroes the tick counter and restores post-boot registers.
    ///
    /// Bus state, including `IF` and `IE`, is left alone.
    pub fn reset(&mut self) {
        self.ticks = 0;
        self.regs.reset(self.config.target);
    }

    /// Writes the register file. The tick counter is not persisted.
    ///
    /// # Errors
    ///
    /// Propagates [`SnapshotError`] from the register file encoder.
    pub fn serialize<W: Write>(&self, out: &mut W) -> Result<(), SnapshotError> {
        self.regs.serialize(out)
    }

    /// Restores the register file. The tick counter keeps its value.
    ///
    /// # Errors
    ///
    /// Propagates [`SnapshotError`] from the register file decoder; the
    /// registers are unchanged on error.
    pub fn deserialize<R: Read>(&mut self, input: &mut R) -> Result<(), SnapshotError> {
        self.regs.deserialize(input)
    }

    /// Clock ticks elapsed since the last reset.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Borrows the register file.
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.regs
    }

    /// Mutably borrows the register file.
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Borrows the instruction set.
    #[must_use]
    pub const fn instructions(&self) -> &I {
        &self.instructions
    }

    /// Mutably borrows the instruction set.
    pub const fn instructions_mut(&mut self) -> &mut I {
        &mut self.instructions
    }

    /// Configuration this core was built with.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }
}

fn emit(sink: &mut Option<&mut dyn TraceSink>, event: TraceEvent) {
    if let Some(sink) = sink {
        sink.on_event(event);
    }
}

//! Host-facing configuration, trace hooks and run-loop types.

use crate::{Interrupt, Target};

/// Top-level configuration for a core instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Hardware model whose post-boot register values `reset` restores.
    pub target: Target,
    /// Enables deterministic trace callback dispatch.
    pub tracing_enabled: bool,
}

impl CoreConfig {
    /// Default configuration for `target`.
    #[must_use]
    pub const fn for_target(target: Target) -> Self {
        Self {
            target,
            tracing_enabled: false,
        }
    }
}

/// Deterministic trace events emitted during a step when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// An opcode was fetched and is about to be dispatched.
    InstructionStart {
        /// Address the opcode was fetched from.
        pc: u16,
        /// Raw opcode byte.
        opcode: u8,
    },
    /// The CPU idled for one machine cycle in low-power halt.
    HaltIdle {
        /// Program counter held while halted.
        pc: u16,
    },
    /// An interrupt was delivered after the instruction or idle cycle.
    InterruptDelivered {
        /// Source that won arbitration.
        source: Interrupt,
        /// Restart address control moved to.
        vector: u16,
    },
    /// The step finished and its cost was added to the tick counter.
    StepRetired {
        /// Clock ticks consumed by this step.
        ticks: u32,
        /// Tick counter after this step.
        total_ticks: u64,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Run loop boundary modes for batched execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunBoundary {
    /// Stop after the step that completes the current video frame.
    Frame,
    /// Stop once the CPU is halted, or after one frame of ticks.
    Halted,
    /// Stop after this many steps.
    Steps(u32),
}

/// Aggregated outcome from running until a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RunOutcome {
    /// Steps executed during this run call.
    pub steps: u32,
    /// Clock ticks consumed during this run call.
    pub ticks: u64,
}

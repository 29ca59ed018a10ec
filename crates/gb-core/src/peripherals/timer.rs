//! DIV/TIMA timer peripheral.
//!
//! Counts in machine cycles. The CPU core notifies it once per step with the
//! step's machine-cycle total.

use crate::memory::map::{DIV_ADDR, TAC_ADDR, TIMA_ADDR, TMA_ADDR};
use crate::{Interrupt, InterruptRegisters};

/// Machine cycles between `DIV` increments (16384 Hz).
pub const DIV_PERIOD_MACHINE_CYCLES: u32 = 64;

/// `TAC` bit that starts `TIMA` counting.
pub const TAC_ENABLE: u8 = 0x04;

/// `TAC` bits that hold state; the rest read back as 1.
const TAC_WRITABLE: u8 = 0x07;

/// Machine cycles per `TIMA` increment, indexed by `TAC & 0x03`.
pub const TIMA_PERIODS_MACHINE_CYCLES: [u32; 4] = [256, 4, 16, 64];

/// Runtime state for the timer peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Timer {
    div_counter: u32,
    tima_counter: u32,
    div: u8,
    tima: u8,
    tma: u8,
    tac: u8,
}

impl Timer {
    /// Creates a stopped timer with all counters zeroed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores power-on state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advances the timer by `machine_cycles`, requesting the TIMER interrupt
    /// on every `TIMA` overflow.
    pub fn step(&mut self, machine_cycles: u32, interrupts: &mut InterruptRegisters) {
        self.div_counter += machine_cycles;
        while self.div_counter >= DIV_PERIOD_MACHINE_CYCLES {
            self.div_counter -= DIV_PERIOD_MACHINE_CYCLES;
            self.div = self.div.wrapping_add(1);
        }

        if self.tac & TAC_ENABLE == 0 {
            return;
        }

        let period = TIMA_PERIODS_MACHINE_CYCLES[usize::from(self.tac & 0x03)];
        self.tima_counter += machine_cycles;
        while self.tima_counter >= period {
            self.tima_counter -= period;
            let (next, overflowed) = self.tima.overflowing_add(1);
            self.tima = if overflowed {
                interrupts.request(Interrupt::Timer);
                self.tma
            } else {
                next
            };
        }
    }

    /// Reads a timer register, or `None` when `addr` is not one.
    #[must_use]
    pub const fn read(&self, addr: u16) -> Option<u8> {
        match addr {
            DIV_ADDR => Some(self.div),
            TIMA_ADDR => Some(self.tima),
            TMA_ADDR => Some(self.tma),
            TAC_ADDR => Some(!TAC_WRITABLE | self.tac),
            _ => None,
        }
    }

    /// Writes a timer register. Returns `false` when `addr` is not one.
    ///
    /// Any write to `DIV` clears it along with its internal prescaler.
    pub const fn write(&mut self, addr: u16, value: u8) -> bool {
        match addr {
            DIV_ADDR => {
                self.div = 0;
                self.div_counter = 0;
            }
            TIMA_ADDR => self.tima = value,
            TMA_ADDR => self.tma = value,
            TAC_ADDR => self.tac = value & TAC_WRITABLE,
            _ => return false,
        }
        true
    }

    /// Current `DIV` value.
    #[must_use]
    pub const fn div(&self) -> u8 {
        self.div
    }

    /// Current `TIMA` value.
    #[must_use]
    pub const fn tima(&self) -> u8 {
        self.tima
    }
}

//! Interrupt sources, the shared IF/IE register bank, and the priority dispatch table.
//!
//! The dispatch table is indexed by the masked pending vector `IF & IE` and is
//! built once at compile time. Priority comes from the order in which sources
//! are tested while the table is built (VBLANK first, JOYPAD last), so every
//! index with more than one bit set resolves to its lowest-numbered source.

use crate::instructions::rst;
use crate::{MemoryBus, Registers};

/// Bits of `IF`/`IE` that correspond to real interrupt lines.
pub const INTERRUPT_LINES_MASK: u8 = 0x1F;

/// Number of entries in the dispatch table (one per 5-bit masked vector).
pub const DISPATCH_TABLE_LEN: usize = 32;

/// Hardware interrupt source, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Interrupt {
    /// Vertical blank (`INT 40`).
    VBlank = 0,
    /// LCD STAT condition (`INT 48`).
    LcdStat = 1,
    /// Timer overflow (`INT 50`).
    Timer = 2,
    /// Serial transfer complete (`INT 58`).
    Serial = 3,
    /// Joypad key transition (`INT 60`).
    Joypad = 4,
}

impl Interrupt {
    /// All sources, highest priority first.
    pub const ALL: [Self; 5] = [
        Self::VBlank,
        Self::LcdStat,
        Self::Timer,
        Self::Serial,
        Self::Joypad,
    ];

    /// Bit position of this source in `IF`/`IE`.
    #[must_use]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Single-bit mask of this source in `IF`/`IE`.
    #[must_use]
    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }

    /// Restart address control transfers to when this source is delivered.
    #[must_use]
    pub const fn vector(self) -> u16 {
        match self {
            Self::VBlank => 0x0040,
            Self::LcdStat => 0x0048,
            Self::Timer => 0x0050,
            Self::Serial => 0x0058,
            Self::Joypad => 0x0060,
        }
    }

    /// Picks the source that wins arbitration for a pending vector.
    ///
    /// Sources are tested in fixed order, not by numeric value of `vector`.
    #[must_use]
    pub const fn highest_priority(vector: u8) -> Option<Self> {
        if vector & Self::VBlank.mask() != 0 {
            Some(Self::VBlank)
        } else if vector & Self::LcdStat.mask() != 0 {
            Some(Self::LcdStat)
        } else if vector & Self::Timer.mask() != 0 {
            Some(Self::Timer)
        } else if vector & Self::Serial.mask() != 0 {
            Some(Self::Serial)
        } else if vector & Self::Joypad.mask() != 0 {
            Some(Self::Joypad)
        } else {
            None
        }
    }
}

/// Interrupt flag (`IF`) and interrupt enable (`IE`) registers.
///
/// One bank is owned by the memory bus and lent by reference to every
/// producer (joypad, timer, video) and to the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InterruptRegisters {
    flag: u8,
    enable: u8,
}

impl InterruptRegisters {
    /// Creates a bank with explicit register values.
    #[must_use]
    pub const fn new(flag: u8, enable: u8) -> Self {
        Self { flag, enable }
    }

    /// Reads `IF`.
    #[must_use]
    pub const fn flag(&self) -> u8 {
        self.flag
    }

    /// Writes `IF`.
    pub const fn set_flag(&mut self, value: u8) {
        self.flag = value;
    }

    /// Reads `IE`.
    #[must_use]
    pub const fn enable(&self) -> u8 {
        self.enable
    }

    /// Writes `IE`. The CPU core never calls this.
    pub const fn set_enable(&mut self, value: u8) {
        self.enable = value;
    }

    /// Raises the pending bit for `source`.
    pub const fn request(&mut self, source: Interrupt) {
        self.flag |= source.mask();
    }

    /// Clears the pending bit for `source` after delivery.
    pub const fn acknowledge(&mut self, source: Interrupt) {
        self.flag &= !source.mask();
    }

    /// Returns `true` when `source` has a pending request.
    #[must_use]
    pub const fn is_requested(&self, source: Interrupt) -> bool {
        self.flag & source.mask() != 0
    }

    /// Masked pending vector `IF & IE`, bounded to the dispatch table domain.
    #[must_use]
    pub const fn pending(&self) -> u8 {
        self.flag & self.enable & INTERRUPT_LINES_MASK
    }

    /// Clears both registers.
    pub const fn reset(&mut self) {
        self.flag = 0;
        self.enable = 0;
    }
}

/// Priority-ordered mapping from masked pending vector to the source delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptDispatchTable {
    entries: [Option<Interrupt>; DISPATCH_TABLE_LEN],
}

/// Process-wide dispatch table shared read-only by every CPU instance.
pub static INTERRUPT_DISPATCH_TABLE: InterruptDispatchTable = InterruptDispatchTable::build();

impl InterruptDispatchTable {
    /// Builds the table by walking every index in numeric order.
    #[must_use]
    pub const fn build() -> Self {
        let mut entries = [None; DISPATCH_TABLE_LEN];
        let mut index = 0;
        while index < DISPATCH_TABLE_LEN {
            #[allow(clippy::cast_possible_truncation)]
            let vector = index as u8;
            entries[index] = Interrupt::highest_priority(vector);
            index += 1;
        }
        Self { entries }
    }

    /// Source delivered for a masked vector, or `None` for the no-op entry.
    #[must_use]
    pub const fn entry(&self, vector: u8) -> Option<Interrupt> {
        self.entries[(vector & INTERRUPT_LINES_MASK) as usize]
    }

    /// Runs the delivery action for `vector`.
    ///
    /// Delivery clears `ime` and `halt`, acknowledges the source in `IF`, and
    /// transfers control through the restart routine, which records its own
    /// machine-cycle cost in the `M` slot. The zero entry does nothing.
    pub fn deliver(
        &self,
        vector: u8,
        regs: &mut Registers,
        bus: &mut dyn MemoryBus,
    ) -> Option<Interrupt> {
        let source = self.entry(vector)?;

        regs.set_ime(false);
        regs.set_halt(false);
        bus.interrupts_mut().acknowledge(source);
        rst(source.vector(), regs, bus);

        log::trace!(
            "delivered {source:?} interrupt, vector {:#06x}",
            source.vector()
        );
        Some(source)
    }
}

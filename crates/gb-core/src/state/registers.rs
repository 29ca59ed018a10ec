use std::io::{Read, Write};

use crate::{SnapshotError, Target};

/// Number of bytes backing every 8-bit and 16-bit register view.
pub const REGISTER_STORAGE_BYTES: usize = 13;
/// Encoding version written at the head of a serialized register file.
pub const REGISTER_SNAPSHOT_VERSION: u8 = 1;
/// Serialized size: version byte, storage bytes, processor-flag byte.
pub const REGISTER_SNAPSHOT_BYTES: usize = REGISTER_STORAGE_BYTES + 2;

/// Processor-flag byte bit for `ime`.
const SNAPSHOT_IME: u8 = 1 << 0;
/// Processor-flag byte bit for `halt`.
const SNAPSHOT_HALT: u8 = 1 << 1;
/// Bits of `F` that hold condition flags; the low nibble always reads zero.
pub const F_FLAGS_MASK: u8 = 0xF0;

/// 8-bit register view.
///
/// `M` is not architectural: it carries the machine-cycle cost of the
/// instruction or interrupt delivery that just ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Reg8 {
    B = 0,
    C = 1,
    D = 2,
    E = 3,
    H = 4,
    L = 5,
    A = 6,
    F = 7,
    M = 12,
}

impl Reg8 {
    /// Byte offset of this register in the backing storage.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// 16-bit register view. Each pair overlays two consecutive storage bytes,
/// high byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Reg16 {
    BC = 0,
    DE = 2,
    HL = 4,
    AF = 6,
    SP = 8,
    PC = 10,
}

impl Reg16 {
    /// Byte offset of the high half of this pair in the backing storage.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// LR35902 register file with aliased 8-bit and 16-bit views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Registers {
    storage: [u8; REGISTER_STORAGE_BYTES],
    ime: bool,
    halt: bool,
}

impl Registers {
    /// Creates a register file in the post-boot state for `target`.
    #[must_use]
    pub fn power_on(target: Target) -> Self {
        let mut regs = Self::default();
        regs.reset(target);
        regs
    }

    /// Restores the post-boot register values for `target`.
    ///
    /// `ime` and `halt` are cleared and `M` is zeroed.
    pub const fn reset(&mut self, target: Target) {
        let (af, bc, de, hl) = match target {
            Target::GameBoy => (0x01B0, 0x0013, 0x00D8, 0x014D),
            Target::GameBoyColor => (0x1180, 0x0000, 0xFF56, 0x000D),
            Target::SuperGameBoy => (0x0100, 0x0014, 0x0000, 0xC060),
        };

        self.storage = [0; REGISTER_STORAGE_BYTES];
        self.set16(Reg16::AF, af);
        self.set16(Reg16::BC, bc);
        self.set16(Reg16::DE, de);
        self.set16(Reg16::HL, hl);
        self.set16(Reg16::SP, 0xFFFE);
        self.set16(Reg16::PC, 0x0100);
        self.ime = false;
        self.halt = false;
    }

    /// Reads an 8-bit register.
    #[must_use]
    pub const fn get8(&self, reg: Reg8) -> u8 {
        self.storage[reg.index()]
    }

    /// Writes an 8-bit register.
    pub const fn set8(&mut self, reg: Reg8, value: u8) {
        let value = match reg {
            Reg8::F => value & F_FLAGS_MASK,
            _ => value,
        };
        self.storage[reg.index()] = value;
    }

    /// Reads a 16-bit register pair.
    #[must_use]
    pub const fn get16(&self, reg: Reg16) -> u16 {
        let index = reg.index();
        u16::from_be_bytes([self.storage[index], self.storage[index + 1]])
    }

    /// Writes a 16-bit register pair.
    pub const fn set16(&mut self, reg: Reg16, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        let lo = match reg {
            Reg16::AF => lo & F_FLAGS_MASK,
            _ => lo,
        };
        let index = reg.index();
        self.storage[index] = hi;
        self.storage[index + 1] = lo;
    }

    /// Reads `PC`.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.get16(Reg16::PC)
    }

    /// Writes `PC`.
    pub const fn set_pc(&mut self, value: u16) {
        self.set16(Reg16::PC, value);
    }

    /// Returns `PC` and advances it by one, wrapping at the top of memory.
    pub const fn bump(&mut self) -> u16 {
        let pc = self.pc();
        self.set_pc(pc.wrapping_add(1));
        pc
    }

    /// Reads `SP`.
    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.get16(Reg16::SP)
    }

    /// Writes `SP`.
    pub const fn set_sp(&mut self, value: u16) {
        self.set16(Reg16::SP, value);
    }

    /// Machine-cycle cost recorded by the last handler.
    #[must_use]
    pub const fn m(&self) -> u8 {
        self.get8(Reg8::M)
    }

    /// Records a machine-cycle cost.
    pub const fn set_m(&mut self, cycles: u8) {
        self.set8(Reg8::M, cycles);
    }

    /// Reads the interrupt master enable flag.
    #[must_use]
    pub const fn ime(&self) -> bool {
        self.ime
    }

    /// Writes the interrupt master enable flag.
    pub const fn set_ime(&mut self, enabled: bool) {
        self.ime = enabled;
    }

    /// Returns `true` while the CPU idles in low-power halt.
    #[must_use]
    pub const fn halt(&self) -> bool {
        self.halt
    }

    /// Enters or leaves low-power halt.
    pub const fn set_halt(&mut self, halted: bool) {
        self.halt = halted;
    }

    /// Writes the fixed byte encoding of this register file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] when `out` rejects the write.
    pub fn serialize<W: Write>(&self, out: &mut W) -> Result<(), SnapshotError> {
        let mut bytes = [0_u8; REGISTER_SNAPSHOT_BYTES];
        bytes[0] = REGISTER_SNAPSHOT_VERSION;
        bytes[1..=REGISTER_STORAGE_BYTES].copy_from_slice(&self.storage);

        let mut flags = 0;
        if self.ime {
            flags |= SNAPSHOT_IME;
        }
        if self.halt {
            flags |= SNAPSHOT_HALT;
        }
        bytes[REGISTER_SNAPSHOT_BYTES - 1] = flags;

        out.write_all(&bytes)?;
        Ok(())
    }

    /// Replaces this register file with one read from `input`.
    ///
    /// The register file is left untouched when decoding fails.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] on short or failed reads,
    /// [`SnapshotError::UnsupportedVersion`] for an unknown encoding version and
    /// [`SnapshotError::InvalidFlags`] when undefined processor-flag bits are set.
    pub fn deserialize<R: Read>(&mut self, input: &mut R) -> Result<(), SnapshotError> {
        let mut bytes = [0_u8; REGISTER_SNAPSHOT_BYTES];
        input.read_exact(&mut bytes)?;

        let version = bytes[0];
        if version != REGISTER_SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version));
        }

        let flags = bytes[REGISTER_SNAPSHOT_BYTES - 1];
        if flags & !(SNAPSHOT_IME | SNAPSHOT_HALT) != 0 {
            return Err(SnapshotError::InvalidFlags(flags));
        }

        self.storage
            .copy_from_slice(&bytes[1..=REGISTER_STORAGE_BYTES]);
        self.storage[Reg8::F.index()] &= F_FLAGS_MASK;
        self.ime = flags & SNAPSHOT_IME != 0;
        self.halt = flags & SNAPSHOT_HALT != 0;
        Ok(())
    }
}

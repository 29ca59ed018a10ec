//! Fixed address-space map and decoding helpers.

/// Inclusive start address of cartridge ROM.
pub const ROM_START: u16 = 0x0000;
/// Inclusive end address of cartridge ROM.
pub const ROM_END: u16 = 0x7FFF;
/// Inclusive start address of video RAM.
pub const VRAM_START: u16 = 0x8000;
/// Inclusive end address of video RAM.
pub const VRAM_END: u16 = 0x9FFF;
/// Inclusive start address of cartridge RAM.
pub const EXTERNAL_RAM_START: u16 = 0xA000;
/// Inclusive end address of cartridge RAM.
pub const EXTERNAL_RAM_END: u16 = 0xBFFF;
/// Inclusive start address of work RAM.
pub const WRAM_START: u16 = 0xC000;
/// Inclusive end address of work RAM.
pub const WRAM_END: u16 = 0xDFFF;
/// Inclusive start address of the work RAM mirror.
pub const ECHO_START: u16 = 0xE000;
/// Inclusive end address of the work RAM mirror.
pub const ECHO_END: u16 = 0xFDFF;
/// Inclusive start address of sprite attribute memory.
pub const OAM_START: u16 = 0xFE00;
/// Inclusive end address of sprite attribute memory.
pub const OAM_END: u16 = 0xFE9F;
/// Inclusive start address of the unusable gap.
pub const UNUSABLE_START: u16 = 0xFEA0;
/// Inclusive end address of the unusable gap.
pub const UNUSABLE_END: u16 = 0xFEFF;
/// Inclusive start address of I/O registers.
pub const IO_START: u16 = 0xFF00;
/// Inclusive end address of I/O registers.
pub const IO_END: u16 = 0xFF7F;
/// Inclusive start address of high RAM.
pub const HRAM_START: u16 = 0xFF80;
/// Inclusive end address of high RAM.
pub const HRAM_END: u16 = 0xFFFE;

/// Joypad select/read register.
pub const P1_ADDR: u16 = 0xFF00;
/// Divider register.
pub const DIV_ADDR: u16 = 0xFF04;
/// Timer counter.
pub const TIMA_ADDR: u16 = 0xFF05;
/// Timer reload modulo.
pub const TMA_ADDR: u16 = 0xFF06;
/// Timer control.
pub const TAC_ADDR: u16 = 0xFF07;
/// Interrupt flag register.
pub const IF_ADDR: u16 = 0xFF0F;
/// Interrupt enable register.
pub const IE_ADDR: u16 = 0xFFFF;

/// Canonical fixed-region descriptor for the address map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionDescriptor {
    /// Region classification.
    pub region: MemoryRegion,
    /// Inclusive start address.
    pub start: u16,
    /// Inclusive end address.
    pub end: u16,
}

/// Region classification for 16-bit addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryRegion {
    /// Cartridge ROM (`0x0000..=0x7FFF`).
    Rom,
    /// Video RAM (`0x8000..=0x9FFF`).
    VideoRam,
    /// Cartridge RAM (`0xA000..=0xBFFF`).
    ExternalRam,
    /// Work RAM (`0xC000..=0xDFFF`).
    WorkRam,
    /// Work RAM mirror (`0xE000..=0xFDFF`).
    Echo,
    /// Sprite attribute memory (`0xFE00..=0xFE9F`).
    Oam,
    /// Unusable gap (`0xFEA0..=0xFEFF`).
    Unusable,
    /// I/O registers (`0xFF00..=0xFF7F`).
    Io,
    /// High RAM (`0xFF80..=0xFFFE`).
    HighRam,
    /// Interrupt enable register (`0xFFFF`).
    InterruptEnable,
}

impl MemoryRegion {
    /// Returns the inclusive bounds for this region.
    #[must_use]
    pub const fn bounds(self) -> (u16, u16) {
        match self {
            Self::Rom => (ROM_START, ROM_END),
            Self::VideoRam => (VRAM_START, VRAM_END),
            Self::ExternalRam => (EXTERNAL_RAM_START, EXTERNAL_RAM_END),
            Self::WorkRam => (WRAM_START, WRAM_END),
            Self::Echo => (ECHO_START, ECHO_END),
            Self::Oam => (OAM_START, OAM_END),
            Self::Unusable => (UNUSABLE_START, UNUSABLE_END),
            Self::Io => (IO_START, IO_END),
            Self::HighRam => (HRAM_START, HRAM_END),
            Self::InterruptEnable => (IE_ADDR, IE_ADDR),
        }
    }

    /// Returns `true` when `addr` belongs to this region.
    #[must_use]
    pub const fn contains(self, addr: u16) -> bool {
        let (start, end) = self.bounds();
        addr >= start && addr <= end
    }

    /// Returns the canonical descriptor for this region.
    #[must_use]
    pub const fn descriptor(self) -> RegionDescriptor {
        let (start, end) = self.bounds();
        RegionDescriptor {
            region: self,
            start,
            end,
        }
    }
}

/// Fixed region layout in ascending address order.
pub const FIXED_MEMORY_REGIONS: [RegionDescriptor; 10] = [
    MemoryRegion::Rom.descriptor(),
    MemoryRegion::VideoRam.descriptor(),
    MemoryRegion::ExternalRam.descriptor(),
    MemoryRegion::WorkRam.descriptor(),
    MemoryRegion::Echo.descriptor(),
    MemoryRegion::Oam.descriptor(),
    MemoryRegion::Unusable.descriptor(),
    MemoryRegion::Io.descriptor(),
    MemoryRegion::HighRam.descriptor(),
    MemoryRegion::InterruptEnable.descriptor(),
];

const _: () = assert_fixed_region_layout();

const fn assert_fixed_region_layout() {
    let mut index = 0;
    while index < FIXED_MEMORY_REGIONS.len() {
        let descriptor = FIXED_MEMORY_REGIONS[index];
        assert!(
            descriptor.start <= descriptor.end,
            "region start cannot be greater than end"
        );

        if index > 0 {
            let previous = FIXED_MEMORY_REGIONS[index - 1];
            assert!(
                previous.end.wrapping_add(1) == descriptor.start,
                "fixed regions must be contiguous"
            );
        }

        index += 1;
    }

    assert!(
        FIXED_MEMORY_REGIONS[0].start == 0x0000
            && FIXED_MEMORY_REGIONS[FIXED_MEMORY_REGIONS.len() - 1].end == u16::MAX,
        "fixed regions must cover full address space"
    );
}

/// Decodes a 16-bit address into its fixed memory region.
#[must_use]
pub const fn decode_memory_region(addr: u16) -> MemoryRegion {
    match addr {
        ROM_START..=ROM_END => MemoryRegion::Rom,
        VRAM_START..=VRAM_END => MemoryRegion::VideoRam,
        EXTERNAL_RAM_START..=EXTERNAL_RAM_END => MemoryRegion::ExternalRam,
        WRAM_START..=WRAM_END => MemoryRegion::WorkRam,
        ECHO_START..=ECHO_END => MemoryRegion::Echo,
        OAM_START..=OAM_END => MemoryRegion::Oam,
        UNUSABLE_START..=UNUSABLE_END => MemoryRegion::Unusable,
        IO_START..=IO_END => MemoryRegion::Io,
        HRAM_START..=HRAM_END => MemoryRegion::HighRam,
        IE_ADDR => MemoryRegion::InterruptEnable,
    }
}

/// Work RAM address shadowed by an echo-region address.
#[must_use]
pub const fn echo_target(addr: u16) -> u16 {
    addr - (ECHO_START - WRAM_START)
}

#[cfg(test)]
mod tests {
    use super::{
        decode_memory_region, echo_target, MemoryRegion, ECHO_END, ECHO_START,
        FIXED_MEMORY_REGIONS, IE_ADDR, IF_ADDR, IO_START, P1_ADDR, ROM_END, TAC_ADDR, WRAM_START,
    };

    #[test]
    fn region_decode_is_correct_at_boundaries() {
        for descriptor in FIXED_MEMORY_REGIONS {
            assert_eq!(decode_memory_region(descriptor.start), descriptor.region);
            assert_eq!(decode_memory_region(descriptor.end), descriptor.region);
        }
        assert_eq!(decode_memory_region(ROM_END), MemoryRegion::Rom);
        assert_eq!(decode_memory_region(IE_ADDR), MemoryRegion::InterruptEnable);
    }

    #[test]
    fn contains_matches_decoder_for_all_addresses() {
        for addr in 0_u16..=u16::MAX {
            let region = decode_memory_region(addr);
            assert!(region.contains(addr));
            for descriptor in FIXED_MEMORY_REGIONS {
                assert_eq!(
                    descriptor.region.contains(addr),
                    descriptor.region == region
                );
            }
        }
    }

    #[test]
    fn io_registers_live_in_the_io_window() {
        for addr in [P1_ADDR, TAC_ADDR, IF_ADDR] {
            assert_eq!(decode_memory_region(addr), MemoryRegion::Io);
        }
        assert_eq!(P1_ADDR, IO_START);
    }

    #[test]
    fn echo_mirrors_the_start_of_work_ram() {
        assert_eq!(echo_target(ECHO_START), WRAM_START);
        assert_eq!(echo_target(ECHO_END), 0xDDFF);
    }
}

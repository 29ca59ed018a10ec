use crate::interrupt::INTERRUPT_LINES_MASK;
use crate::memory::map::{
    decode_memory_region, echo_target, MemoryRegion, DIV_ADDR, IE_ADDR, IF_ADDR, P1_ADDR,
    ROM_END, TAC_ADDR,
};
use crate::memory::{new_address_space, MemoryBus};
use crate::target::{HEADER_CARTRIDGE_TYPE, HEADER_END};
use crate::{Button, InterruptRegisters, Joypad, RomLoadError, Timer};

/// Bits of `IF` with no interrupt line behind them; they read back as 1.
const IF_UNUSED: u8 = !INTERRUPT_LINES_MASK;

/// Value returned by reads from the unusable gap.
const OPEN_BUS: u8 = 0xFF;

/// Largest cartridge image mapped without a bank controller.
pub const UNBANKED_ROM_BYTES: usize = ROM_END as usize + 1;

/// Flat 64 KiB bus that owns the interrupt register bank.
///
/// Decodes `P1`, the timer registers (when a timer is attached), `IF` and
/// `IE`. Echo RAM mirrors work RAM and writes into ROM are dropped.
#[derive(Debug, Clone)]
pub struct SystemBus {
    memory: Box<[u8]>,
    interrupts: InterruptRegisters,
    timer: Option<Timer>,
    joypad: Joypad,
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBus {
    /// Creates a zeroed bus with no timer attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: new_address_space(),
            interrupts: InterruptRegisters::default(),
            timer: None,
            joypad: Joypad::new(),
        }
    }

    /// Attaches a fresh timer.
    #[must_use]
    pub fn with_timer(mut self) -> Self {
        self.timer = Some(Timer::new());
        self
    }

    /// Attaches `timer`, replacing any timer already present.
    pub const fn attach_timer(&mut self, timer: Timer) {
        self.timer = Some(timer);
    }

    /// Removes and returns the attached timer.
    pub const fn detach_timer(&mut self) -> Option<Timer> {
        self.timer.take()
    }

    /// Borrows the attached timer.
    #[must_use]
    pub const fn timer(&self) -> Option<&Timer> {
        self.timer.as_ref()
    }

    /// Borrows the joypad.
    #[must_use]
    pub const fn joypad(&self) -> &Joypad {
        &self.joypad
    }

    /// Presses a key, requesting the JOYPAD interrupt.
    pub fn key_down(&mut self, button: Button) {
        self.joypad.key_down(button, &mut self.interrupts);
    }

    /// Releases a key.
    pub fn key_up(&mut self, button: Button) {
        self.joypad.key_up(button);
    }

    /// Copies a cartridge image into the ROM window and zeroes the rest of
    /// the window.
    ///
    /// # Errors
    ///
    /// Returns [`RomLoadError::Empty`] for an empty image and
    /// [`RomLoadError::TooLarge`] when it exceeds the unbanked window.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), RomLoadError> {
        if rom.is_empty() {
            return Err(RomLoadError::Empty);
        }
        if rom.len() > UNBANKED_ROM_BYTES {
            return Err(RomLoadError::TooLarge { len: rom.len() });
        }

        if rom.len() >= HEADER_END && rom[HEADER_CARTRIDGE_TYPE] != 0x00 {
            log::warn!(
                "cartridge type {:#04x} expects a bank controller; mapping the first {} bytes flat",
                rom[HEADER_CARTRIDGE_TYPE],
                rom.len()
            );
        }

        self.memory[..rom.len()].copy_from_slice(rom);
        self.memory[rom.len()..UNBANKED_ROM_BYTES].fill(0);
        Ok(())
    }

    /// Copies raw bytes into backing memory starting at `addr`, bypassing I/O
    /// decode and ROM write protection. Addresses wrap at the top of memory.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let mut target = addr;
        for byte in bytes {
            self.memory[usize::from(target)] = *byte;
            target = target.wrapping_add(1);
        }
    }

    /// Raw backing memory, without I/O decode.
    #[must_use]
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Resets bus-owned device state: `IF`, `IE`, timer and joypad.
    ///
    /// The memory image is preserved.
    pub fn reset(&mut self) {
        self.interrupts.reset();
        if let Some(timer) = self.timer.as_mut() {
            timer.reset();
        }
        self.joypad.reset();
    }
}

impl MemoryBus for SystemBus {
    fn read_byte(&mut self, addr: u16) -> u8 {
        match addr {
            P1_ADDR => self.joypad.read(),
            DIV_ADDR..=TAC_ADDR => self
                .timer
                .as_ref()
                .and_then(|timer| timer.read(addr))
                .unwrap_or_else(|| self.memory[usize::from(addr)]),
            IF_ADDR => IF_UNUSED | self.interrupts.flag(),
            IE_ADDR => self.interrupts.enable(),
            _ => match decode_memory_region(addr) {
                MemoryRegion::Echo => self.memory[usize::from(echo_target(addr))],
                MemoryRegion::Unusable => OPEN_BUS,
                _ => self.memory[usize::from(addr)],
            },
        }
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        match addr {
            P1_ADDR => self.joypad.write(value),
            DIV_ADDR..=TAC_ADDR => match self.timer.as_mut() {
                Some(timer) => {
                    timer.write(addr, value);
                }
                None => self.memory[usize::from(addr)] = value,
            },
            IF_ADDR => self.interrupts.set_flag(value & INTERRUPT_LINES_MASK),
            IE_ADDR => self.interrupts.set_enable(value),
            _ => match decode_memory_region(addr) {
                MemoryRegion::Rom | MemoryRegion::Unusable => {}
                MemoryRegion::Echo => self.memory[usize::from(echo_target(addr))] = value,
                _ => self.memory[usize::from(addr)] = value,
            },
        }
    }

    fn interrupts(&self) -> &InterruptRegisters {
        &self.interrupts
    }

    fn interrupts_mut(&mut self) -> &mut InterruptRegisters {
        &mut self.interrupts
    }

    fn step_timer(&mut self, machine_cycles: u32) {
        if let Some(timer) = self.timer.as_mut() {
            timer.step(machine_cycles, &mut self.interrupts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SystemBus, UNBANKED_ROM_BYTES};
    use crate::memory::map::{DIV_ADDR, IE_ADDR, IF_ADDR, P1_ADDR, TAC_ADDR};
    use crate::{Button, Interrupt, MemoryBus, RomLoadError, TAC_ENABLE};

    #[test]
    fn interrupt_registers_are_decoded() {
        let mut bus = SystemBus::new();
        bus.write_byte(IE_ADDR, 0x1F);
        bus.write_byte(IF_ADDR, 0xFF);

        assert_eq!(bus.interrupts().enable(), 0x1F);
        assert_eq!(bus.interrupts().flag(), 0x1F);
        assert_eq!(bus.read_byte(IF_ADDR), 0xFF);

        bus.interrupts_mut().acknowledge(Interrupt::VBlank);
        assert_eq!(bus.read_byte(IF_ADDR), 0xFE);
    }

    #[test]
    fn rom_writes_are_dropped_and_ram_writes_land() {
        let mut bus = SystemBus::new();
        bus.load_rom(&[0x00, 0x76]).expect("tiny image loads");

        bus.write_byte(0x0001, 0xAA);
        bus.write_byte(0xC000, 0x42);
        bus.write_byte(0xFF80, 0x99);

        assert_eq!(bus.read_byte(0x0001), 0x76);
        assert_eq!(bus.read_byte(0xC000), 0x42);
        assert_eq!(bus.read_byte(0xFF80), 0x99);
    }

    #[test]
    fn echo_region_mirrors_work_ram() {
        let mut bus = SystemBus::new();
        bus.write_byte(0xE010, 0x5A);
        assert_eq!(bus.read_byte(0xC010), 0x5A);

        bus.write_byte(0xC020, 0xA5);
        assert_eq!(bus.read_byte(0xE020), 0xA5);
    }

    #[test]
    fn unusable_gap_reads_open_bus() {
        let mut bus = SystemBus::new();
        bus.write_byte(0xFEA0, 0x00);
        assert_eq!(bus.read_byte(0xFEA0), 0xFF);
    }

    #[test]
    fn timer_registers_fall_back_to_memory_without_timer() {
        let mut bus = SystemBus::new();
        bus.write_byte(TAC_ADDR, 0x05);
        assert_eq!(bus.read_byte(TAC_ADDR), 0x05);
        bus.step_timer(1_000);
        assert_eq!(bus.interrupts().flag(), 0);
    }

    #[test]
    fn attached_timer_is_stepped_and_raises_interrupts() {
        let mut bus = SystemBus::new().with_timer();
        bus.write_byte(TAC_ADDR, TAC_ENABLE | 0x01);
        assert_eq!(bus.read_byte(TAC_ADDR), 0xFD);

        bus.step_timer(4 * 256);

        assert!(bus.interrupts().is_requested(Interrupt::Timer));
        assert_eq!(bus.read_byte(DIV_ADDR), 16);
    }

    #[test]
    fn joypad_is_reachable_through_p1() {
        let mut bus = SystemBus::new();
        bus.key_down(Button::B);
        bus.write_byte(P1_ADDR, 0x10);

        assert_eq!(bus.read_byte(P1_ADDR), 0xC0 | 0x10 | 0x0D);
        assert!(bus.interrupts().is_requested(Interrupt::Joypad));

        bus.key_up(Button::B);
        assert!(!bus.joypad().is_pressed(Button::B));
    }

    #[test]
    fn load_rom_rejects_empty_and_oversized_images() {
        let mut bus = SystemBus::new();
        assert_eq!(bus.load_rom(&[]), Err(RomLoadError::Empty));

        let oversized = vec![0; UNBANKED_ROM_BYTES + 1];
        assert_eq!(
            bus.load_rom(&oversized),
            Err(RomLoadError::TooLarge {
                len: UNBANKED_ROM_BYTES + 1
            })
        );
    }

    #[test]
    fn smaller_image_clears_the_rest_of_the_rom_window() {
        let mut bus = SystemBus::new();
        let mut large = vec![0x00; 0x0200];
        large[0x0101] = 0x76;
        large[0x01FF] = 0xC9;
        bus.load_rom(&large).expect("large image loads");

        bus.load_rom(&[0x00; 0x0101]).expect("small image loads");

        assert_eq!(bus.read_byte(0x0101), 0x00);
        assert_eq!(bus.read_byte(0x01FF), 0x00);
        assert!(bus.memory()[..UNBANKED_ROM_BYTES].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn reset_clears_devices_but_keeps_memory() {
        let mut bus = SystemBus::new().with_timer();
        bus.load(0xC000, &[1, 2, 3]);
        bus.interrupts_mut().set_enable(0x1F);
        bus.key_down(Button::A);

        bus.reset();

        assert_eq!(bus.interrupts().flag(), 0);
        assert_eq!(bus.interrupts().enable(), 0);
        assert!(!bus.joypad().is_pressed(Button::A));
        assert_eq!(&bus.memory()[0xC000..0xC003], &[1, 2, 3]);
    }
}

//! Whole-machine driver wiring a [`Cpu`] to a [`SystemBus`] with a timer.

use crate::timing::TICKS_PER_FRAME;
use crate::{Button, CoreConfig, Cpu, RomLoadError, RunBoundary, RunOutcome, SystemBus, Target};

/// CPU, bus and frame bookkeeping for one handheld.
#[derive(Debug, Clone)]
pub struct GameBoy {
    cpu: Cpu,
    bus: SystemBus,
    frames: u32,
    frame_ticks: u32,
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl GameBoy {
    /// Creates a machine with an empty cartridge slot and the timer attached.
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        Self {
            cpu: Cpu::new(config),
            bus: SystemBus::new().with_timer(),
            frames: 0,
            frame_ticks: 0,
        }
    }

    /// Creates a machine running `rom`, targeting the model its header asks for.
    ///
    /// # Errors
    ///
    /// Returns [`RomLoadError`] when the image cannot be mapped.
    pub fn from_rom(rom: &[u8], tracing_enabled: bool) -> Result<Self, RomLoadError> {
        let target = Target::guess(rom).unwrap_or_default();
        let mut machine = Self::new(CoreConfig {
            target,
            tracing_enabled,
        });
        machine.load_rom(rom)?;
        Ok(machine)
    }

    /// Maps `rom` into the cartridge window and resets the machine.
    ///
    /// # Errors
    ///
    /// Returns [`RomLoadError`] when the image cannot be mapped; the machine
    /// is left untouched in that case.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), RomLoadError> {
        self.bus.load_rom(rom)?;
        log::debug!(
            "loaded {} byte rom for {}",
            rom.len(),
            self.cpu.config().target
        );
        self.reset();
        Ok(())
    }

    /// Runs one CPU step and returns its clock ticks.
    ///
    /// # Panics
    ///
    /// Panics when the fetched opcode has no handler installed.
    pub fn step(&mut self) -> u32 {
        let was_halted = self.cpu.registers().halt();
        let ticks = self.cpu.step(&mut self.bus);
        let halted = self.cpu.registers().halt();

        if halted != was_halted {
            if halted {
                log::debug!("cpu halted at pc {:#06x}", self.cpu.registers().pc());
            } else {
                log::debug!("cpu woke, entering {:#06x}", self.cpu.registers().pc());
            }
        }

        self.frame_ticks += ticks;
        while self.frame_ticks >= TICKS_PER_FRAME {
            self.frame_ticks -= TICKS_PER_FRAME;
            self.frames += 1;
        }
        ticks
    }

    /// Steps until `boundary` is reached.
    ///
    /// # Panics
    ///
    /// Panics when a fetched opcode has no handler installed.
    pub fn run(&mut self, boundary: RunBoundary) -> RunOutcome {
        let mut outcome = RunOutcome::default();
        match boundary {
            RunBoundary::Steps(count) => {
                for _ in 0..count {
                    self.step_into(&mut outcome);
                }
            }
            RunBoundary::Frame => {
                let frames = self.frames;
                while self.frames == frames {
                    self.step_into(&mut outcome);
                }
            }
            RunBoundary::Halted => {
                while !self.cpu.registers().halt() && outcome.ticks < u64::from(TICKS_PER_FRAME) {
                    self.step_into(&mut outcome);
                }
            }
        }
        outcome
    }

    /// Runs one video frame of clock ticks. Overshoot past the frame edge is
    /// charged to the next frame.
    ///
    /// # Panics
    ///
    /// Panics when a fetched opcode has no handler installed.
    pub fn run_frame(&mut self) -> RunOutcome {
        self.run(RunBoundary::Frame)
    }

    fn step_into(&mut self, outcome: &mut RunOutcome) {
        let ticks = self.step();
        outcome.steps += 1;
        outcome.ticks += u64::from(ticks);
    }

    /// Frames completed since the last call, resetting the count.
    pub fn frames(&mut self) -> u32 {
        std::mem::take(&mut self.frames)
    }

    /// Presses a key.
    pub fn key_down(&mut self, button: Button) {
        self.bus.key_down(button);
    }

    /// Releases a key.
    pub fn key_up(&mut self, button: Button) {
        self.bus.key_up(button);
    }

    /// Resets the CPU and the bus devices. The memory image is kept.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.frames = 0;
        self.frame_ticks = 0;
    }

    /// Borrows the CPU.
    #[must_use]
    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutably borrows the CPU.
    pub const fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Borrows the bus.
    #[must_use]
    pub const fn bus(&self) -> &SystemBus {
        &self.bus
    }

    /// Mutably borrows the bus.
    pub const fn bus_mut(&mut self) -> &mut SystemBus {
        &mut self.bus
    }
}

//! Joypad input peripheral behind the `P1` register.
//!
//! Key state is active low: a pressed key clears its line.

use crate::{Interrupt, InterruptRegisters};

/// `P1` bit that selects the action-button column when written low.
pub const SELECT_BUTTONS: u8 = 0x20;
/// `P1` bit that selects the direction-pad column when written low.
pub const SELECT_DIRECTIONS: u8 = 0x10;
/// `P1` bits that are writable.
const SELECT_MASK: u8 = SELECT_BUTTONS | SELECT_DIRECTIONS;
/// Unused `P1` bits, which read back as 1.
const P1_UNUSED: u8 = 0xC0;
/// All four input lines released.
const LINES_RELEASED: u8 = 0x0F;

/// Physical key on the handheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
}

impl Button {
    /// Every key, action buttons first.
    pub const ALL: [Self; 8] = [
        Self::A,
        Self::B,
        Self::Select,
        Self::Start,
        Self::Right,
        Self::Left,
        Self::Up,
        Self::Down,
    ];

    /// Input line this key pulls low within its column.
    #[must_use]
    pub const fn line_mask(self) -> u8 {
        match self {
            Self::A | Self::Right => 0x01,
            Self::B | Self::Left => 0x02,
            Self::Select | Self::Up => 0x04,
            Self::Start | Self::Down => 0x08,
        }
    }

    /// Returns `true` for the direction-pad column.
    #[must_use]
    pub const fn is_direction(self) -> bool {
        matches!(self, Self::Right | Self::Left | Self::Up | Self::Down)
    }
}

/// Runtime state for the joypad peripheral.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Joypad {
    buttons: u8,
    directions: u8,
    select: u8,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            buttons: LINES_RELEASED,
            directions: LINES_RELEASED,
            select: SELECT_MASK,
        }
    }
}

impl Joypad {
    /// Creates a joypad with every key released and no column selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases every key and deselects both columns.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Reads `P1`. Selecting both columns merges their lines.
    #[must_use]
    pub const fn read(&self) -> u8 {
        let mut lines = LINES_RELEASED;
        if self.select & SELECT_BUTTONS == 0 {
            lines &= self.buttons;
        }
        if self.select & SELECT_DIRECTIONS == 0 {
            lines &= self.directions;
        }
        P1_UNUSED | self.select | lines
    }

    /// Writes `P1`. Only the column-select bits are stored.
    pub const fn write(&mut self, value: u8) {
        self.select = value & SELECT_MASK;
    }

    /// Presses `button` and requests the JOYPAD interrupt.
    pub fn key_down(&mut self, button: Button, interrupts: &mut InterruptRegisters) {
        interrupts.request(Interrupt::Joypad);
        *self.column_mut(button) &= !button.line_mask();
    }

    /// Releases `button`. Releases never request an interrupt.
    pub fn key_up(&mut self, button: Button) {
        *self.column_mut(button) |= button.line_mask();
    }

    /// Returns `true` while `button` is held.
    #[must_use]
    pub const fn is_pressed(&self, button: Button) -> bool {
        let column = if button.is_direction() {
            self.directions
        } else {
            self.buttons
        };
        column & button.line_mask() == 0
    }

    const fn column_mut(&mut self, button: Button) -> &mut u8 {
        if button.is_direction() {
            &mut self.directions
        } else {
            &mut self.buttons
        }
    }
}

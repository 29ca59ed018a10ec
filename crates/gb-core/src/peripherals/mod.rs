//! Bus-attached devices that produce interrupt requests.

/// Joypad input behind `P1`.
pub mod joypad;
/// DIV/TIMA timer.
pub mod timer;

pub use joypad::{Button, Joypad, SELECT_BUTTONS, SELECT_DIRECTIONS};
pub use timer::{Timer, DIV_PERIOD_MACHINE_CYCLES, TAC_ENABLE, TIMA_PERIODS_MACHINE_CYCLES};

//! Architectural CPU state model primitives.

/// Register file storage and its aliased 8-bit/16-bit views.
pub mod registers;

pub use registers::{
    Reg16, Reg8, Registers, F_FLAGS_MASK, REGISTER_SNAPSHOT_BYTES, REGISTER_SNAPSHOT_VERSION,
    REGISTER_STORAGE_BYTES,
};

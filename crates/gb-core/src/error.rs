use thiserror::Error;

/// Failure while encoding or decoding a register-file snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The underlying reader or writer failed, including short reads.
    #[error("snapshot i/o failed")]
    Io(#[from] std::io::Error),
    /// The encoding version byte is not one this build understands.
    #[error("unsupported register snapshot version {0}")]
    UnsupportedVersion(u8),
    /// The processor-flag byte has bits outside `ime`/`halt` set.
    #[error("register snapshot flag byte {0:#04x} has undefined bits set")]
    InvalidFlags(u8),
}

/// Failure while placing a cartridge image on the flat system bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RomLoadError {
    /// The image has no bytes.
    #[error("rom image is empty")]
    Empty,
    /// The image does not fit the unbanked ROM window.
    #[error("rom image of {len} bytes exceeds the 32 KiB unbanked window")]
    TooLarge {
        /// Length of the rejected image in bytes.
        len: usize,
    },
}

/// Failure while parsing a hardware target name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("unknown hardware target `{0}` (expected gb, cgb or sgb)")]
pub struct ParseTargetError(pub String);

use std::fmt;
use std::str::FromStr;

use crate::ParseTargetError;

/// Cartridge header offset of the CGB compatibility flag.
pub const HEADER_CGB_FLAG: usize = 0x0143;
/// Cartridge header offset of the SGB support flag.
pub const HEADER_SGB_FLAG: usize = 0x0146;
/// Cartridge header offset of the cartridge (bank controller) type.
pub const HEADER_CARTRIDGE_TYPE: usize = 0x0147;
/// Smallest image that carries a complete cartridge header.
pub const HEADER_END: usize = 0x0150;

/// Hardware model being emulated. Selects post-boot register values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Target {
    /// Original monochrome Game Boy.
    #[default]
    GameBoy,
    /// Game Boy Color.
    GameBoyColor,
    /// Super Game Boy cartridge adapter.
    SuperGameBoy,
}

impl Target {
    /// Picks the best hardware model for a cartridge from its header.
    ///
    /// Returns `None` when `rom` is too short to carry a header.
    #[must_use]
    pub fn guess(rom: &[u8]) -> Option<Self> {
        if rom.len() < HEADER_END {
            return None;
        }

        let target = match (rom[HEADER_CGB_FLAG], rom[HEADER_SGB_FLAG]) {
            (0x80 | 0xC0, _) => Self::GameBoyColor,
            (_, 0x03) => Self::SuperGameBoy,
            _ => Self::GameBoy,
        };
        Some(target)
    }

    /// Short command-line name (`gb`, `cgb`, `sgb`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GameBoy => "gb",
            Self::GameBoyColor => "cgb",
            Self::SuperGameBoy => "sgb",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gb" => Ok(Self::GameBoy),
            "cgb" => Ok(Self::GameBoyColor),
            "sgb" => Ok(Self::SuperGameBoy),
            other => Err(ParseTargetError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Target, HEADER_CGB_FLAG, HEADER_END, HEADER_SGB_FLAG};

    fn header(cgb: u8, sgb: u8) -> Vec<u8> {
        let mut rom = vec![0; HEADER_END];
        rom[HEADER_CGB_FLAG] = cgb;
        rom[HEADER_SGB_FLAG] = sgb;
        rom
    }

    #[test]
    fn guess_prefers_color_over_super() {
        assert_eq!(Target::guess(&header(0x80, 0x03)), Some(Target::GameBoyColor));
        assert_eq!(Target::guess(&header(0xC0, 0x00)), Some(Target::GameBoyColor));
        assert_eq!(Target::guess(&header(0x00, 0x03)), Some(Target::SuperGameBoy));
        assert_eq!(Target::guess(&header(0x00, 0x00)), Some(Target::GameBoy));
    }

    #[test]
    fn guess_needs_a_full_header() {
        assert_eq!(Target::guess(&[0; HEADER_END - 1]), None);
        assert_eq!(Target::guess(&[]), None);
    }

    #[test]
    fn names_roundtrip_through_from_str() {
        for target in [Target::GameBoy, Target::GameBoyColor, Target::SuperGameBoy] {
            assert_eq!(target.name().parse::<Target>(), Ok(target));
            assert_eq!(target.to_string(), target.name());
        }
        assert!("gba".parse::<Target>().is_err());
    }
}

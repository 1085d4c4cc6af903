use std::{fmt, str::FromStr};

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

pub const DEFAULT_BACKGROUND_COLOR: Chip8Color = Chip8Color::new(0, 0, 0);
pub const DEFAULT_FOREGROUND_COLOR: Chip8Color = Chip8Color::new(255, 255, 255);

/// A pixel color. Laid out so a slice of colors is a little-endian
/// RGBX8888 pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Chip8Color {
    padding: u8,
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Chip8Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Chip8Color {
        Chip8Color { r, g, b, padding: 0 }
    }

    pub const fn from_rgb(rgb: u32) -> Chip8Color {
        Chip8Color::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub const fn rgb(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

impl fmt::Display for Chip8Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}", self.rgb())
    }
}

impl FromStr for Chip8Color {
    type Err = Chip8ColorParseError;

    fn from_str(s: &str) -> Result<Chip8Color, Chip8ColorParseError> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix('#'))
            .unwrap_or(s);

        if hex.len() != 6 || hex.chars().any(|c| !c.is_ascii_hexdigit()) {
            return Err(Chip8ColorParseError(s.to_string()));
        }

        let rgb = u32::from_str_radix(hex, 16).map_err(|_| Chip8ColorParseError(s.to_string()))?;
        Ok(Chip8Color::from_rgb(rgb))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse hex color: {0:?}")]
pub struct Chip8ColorParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixed() {
        let c: Chip8Color = "0xAABBFF".parse().unwrap();
        assert_eq!(c, Chip8Color::new(0xAA, 0xBB, 0xFF));
    }

    #[test]
    fn test_parse_hash_and_bare() {
        assert_eq!("#102030".parse(), Ok(Chip8Color::new(0x10, 0x20, 0x30)));
        assert_eq!("ff8000".parse(), Ok(Chip8Color::new(0xFF, 0x80, 0x00)));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("0xFFF".parse::<Chip8Color>().is_err());
        assert!("0xGG0000".parse::<Chip8Color>().is_err());
        assert!("".parse::<Chip8Color>().is_err());
    }

    #[test]
    fn test_rgb_round_trip_and_display() {
        let c = Chip8Color::from_rgb(0x00FF7F);
        assert_eq!(c.rgb(), 0x00FF7F);
        assert_eq!(c.to_string(), "0x00FF7F");
    }

    #[test]
    fn test_byte_layout() {
        let px = [Chip8Color::new(1, 2, 3)];
        let bytes: &[u8] = bytemuck::cast_slice(&px);
        assert_eq!(bytes, &[0, 3, 2, 1]);
    }
}

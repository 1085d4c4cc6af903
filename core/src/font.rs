use std::str::FromStr;

use thiserror::Error;

/// Size of a full hex-digit font: 16 glyphs of 5 rows.
pub const FONT_SIZE: usize = 80;
pub const GLYPH_HEIGHT: u16 = 5;

pub static CHIP48_FONT: [u8; FONT_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

pub static COSMAC_VIP_FONT: [u8; FONT_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x60, 0x20, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0xA0, 0xA0, 0xF0, 0x20, 0x20, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x10, 0x10, 0x10, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xF0, 0x50, 0x70, 0x50, 0xF0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xF0, 0x50, 0x50, 0x50, 0xF0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

pub static DREAM_6800_FONT: [u8; FONT_SIZE] = [
    0xE0, 0xA0, 0xA0, 0xA0, 0xE0, // 0
    0x40, 0x40, 0x40, 0x40, 0x40, // 1
    0xE0, 0x20, 0xE0, 0x80, 0xE0, // 2
    0xE0, 0x20, 0xE0, 0x20, 0xE0, // 3
    0x80, 0xA0, 0xA0, 0xE0, 0x20, // 4
    0xE0, 0x80, 0xE0, 0x20, 0xE0, // 5
    0xE0, 0x80, 0xE0, 0xA0, 0xE0, // 6
    0xE0, 0x20, 0x20, 0x20, 0x20, // 7
    0xE0, 0xA0, 0xE0, 0xA0, 0xE0, // 8
    0xE0, 0xA0, 0xE0, 0x20, 0xE0, // 9
    0xE0, 0xA0, 0xE0, 0xA0, 0xA0, // A
    0xC0, 0xA0, 0xE0, 0xA0, 0xC0, // B
    0xE0, 0x80, 0x80, 0x80, 0xE0, // C
    0xC0, 0xA0, 0xA0, 0xA0, 0xC0, // D
    0xE0, 0x80, 0xE0, 0x80, 0xE0, // E
    0xE0, 0x80, 0xC0, 0x80, 0x80, // F
];

pub static ETI_660_FONT: [u8; FONT_SIZE] = [
    0xE0, 0xA0, 0xA0, 0xA0, 0xE0, // 0
    0x20, 0x20, 0x20, 0x20, 0x20, // 1
    0xE0, 0x20, 0xE0, 0x80, 0xE0, // 2
    0xE0, 0x20, 0xE0, 0x20, 0xE0, // 3
    0xA0, 0xA0, 0xE0, 0x20, 0x20, // 4
    0xE0, 0x80, 0xE0, 0x20, 0xE0, // 5
    0xE0, 0x80, 0xE0, 0xA0, 0xE0, // 6
    0xE0, 0x20, 0x20, 0x20, 0x20, // 7
    0xE0, 0xA0, 0xE0, 0xA0, 0xE0, // 8
    0xE0, 0xA0, 0xE0, 0x20, 0xE0, // 9
    0xE0, 0xA0, 0xE0, 0xA0, 0xA0, // A
    0x80, 0x80, 0xE0, 0xA0, 0xE0, // B
    0xE0, 0x80, 0x80, 0x80, 0xE0, // C
    0x20, 0x20, 0xE0, 0xA0, 0xE0, // D
    0xE0, 0x80, 0xE0, 0x80, 0xE0, // E
    0xE0, 0x80, 0xC0, 0x80, 0x80, // F
];

/// Built-in hex-digit fonts, named after the machines they come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BuiltinFont {
    #[default]
    Chip48,
    CosmacVip,
    Dream6800,
    Eti660,
}

impl BuiltinFont {
    pub fn bytes(&self) -> &'static [u8; FONT_SIZE] {
        match self {
            BuiltinFont::Chip48 => &CHIP48_FONT,
            BuiltinFont::CosmacVip => &COSMAC_VIP_FONT,
            BuiltinFont::Dream6800 => &DREAM_6800_FONT,
            BuiltinFont::Eti660 => &ETI_660_FONT,
        }
    }
}

impl FromStr for BuiltinFont {
    type Err = FontParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chip48" | "chip-48" => Ok(BuiltinFont::Chip48),
            "cosmac" | "vip" | "cosmac-vip" => Ok(BuiltinFont::CosmacVip),
            "dream" | "dream6800" => Ok(BuiltinFont::Dream6800),
            "eti" | "eti660" => Ok(BuiltinFont::Eti660),
            _ => Err(FontParseError::UnknownFont(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontParseError {
    #[error("unknown built-in font {0:?}")]
    UnknownFont(String),

    #[error("line {line}: {text:?} is not an 8-bit binary row")]
    BadRow { line: usize, text: String },

    #[error("font has {0} rows, expected at most {FONT_SIZE}")]
    TooManyRows(usize),
}

/// Parses a textual font: glyph headers such as `0x0:` followed by one
/// `0b11110000` row per line. Headers and blank lines are skipped.
pub fn parse_font_text(text: &str) -> Result<Vec<u8>, FontParseError> {
    let mut rows = Vec::with_capacity(FONT_SIZE);

    for (n, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.ends_with(':') {
            continue;
        }

        let digits = line.strip_prefix("0b").unwrap_or(line);
        let row = u8::from_str_radix(digits, 2).map_err(|_| FontParseError::BadRow {
            line: n + 1,
            text: line.to_string(),
        })?;
        rows.push(row);
    }

    if rows.len() > FONT_SIZE {
        return Err(FontParseError::TooManyRows(rows.len()));
    }
    Ok(rows)
}

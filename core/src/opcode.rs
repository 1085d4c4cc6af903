// Field extraction for 16-bit CHIP-8 instruction words.
//
// Nibbles and bytes are indexed from the most significant end, so for the
// word 0xD123 nibble 0 is 0xD and byte 1 is 0x23.

use crate::Chip8Error;

const NIBBLE_MAX: u8 = 3;
const BYTE_MAX: u8 = 1;

/// Returns nibble `index` (0-3) of `opcode`.
pub fn nibble(opcode: u16, index: u8) -> Result<u8, Chip8Error> {
    if index > NIBBLE_MAX {
        return Err(Chip8Error::OutOfRange {
            index,
            max: NIBBLE_MAX,
        });
    }
    let shift = 4 * (NIBBLE_MAX - index);
    Ok(((opcode >> shift) & 0xF) as u8)
}

/// Returns byte `index` (0-1) of `opcode`.
pub fn byte(opcode: u16, index: u8) -> Result<u8, Chip8Error> {
    if index > BYTE_MAX {
        return Err(Chip8Error::OutOfRange {
            index,
            max: BYTE_MAX,
        });
    }
    let shift = 8 * (BYTE_MAX - index);
    Ok(((opcode >> shift) & 0xFF) as u8)
}

/// The 12-bit address operand (NNN).
#[inline(always)]
pub const fn address(opcode: u16) -> u16 {
    opcode & 0x0FFF
}

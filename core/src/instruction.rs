use std::fmt;

use crate::{
    opcode::{address, byte, nibble},
    Chip8Error,
};

/// A decoded CHIP-8 instruction. Register operands are 4-bit indices,
/// addresses are 12 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 0NNN: call a machine language routine (ignored)
    Sys(u16),
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm(u8, u8),
    /// 4XNN
    SkipNeqImm(u8, u8),
    /// 5XY0
    SkipEqReg(u8, u8),
    /// 6XNN
    LoadImm(u8, u8),
    /// 7XNN
    AddImm(u8, u8),
    /// 8XY0
    LoadReg(u8, u8),
    /// 8XY1
    Or(u8, u8),
    /// 8XY2
    And(u8, u8),
    /// 8XY3
    Xor(u8, u8),
    /// 8XY4
    AddReg(u8, u8),
    /// 8XY5
    SubXY(u8, u8),
    /// 8XY6
    ShiftRight(u8, u8),
    /// 8XY7
    SubYX(u8, u8),
    /// 8XYE
    ShiftLeft(u8, u8),
    /// 9XY0
    SkipNeqReg(u8, u8),
    /// ANNN
    LoadIndex(u16),
    /// BNNN / BXNN: the raw operand, interpreted by the compatibility mode
    JumpOffset(u16),
    /// CXNN
    Random(u8, u8),
    /// DXYN
    Draw(u8, u8, u8),
    /// EX9E
    SkipKey(u8),
    /// EXA1
    SkipNotKey(u8),
    /// FX07
    LoadDelay(u8),
    /// FX0A
    WaitKey(u8),
    /// FX15
    SetDelay(u8),
    /// FX18
    SetSound(u8),
    /// FX1E
    AddIndex(u8),
    /// FX29
    LoadGlyph(u8),
    /// FX33
    StoreBcd(u8),
    /// FX55
    StoreRegs(u8),
    /// FX65
    LoadRegs(u8),
}

impl Instruction {
    /// Decodes `opcode`. `addr` is only used to report unknown opcodes.
    pub fn decode(opcode: u16, addr: u16) -> Result<Instruction, Chip8Error> {
        use Instruction::*;

        let x = nibble(opcode, 1)?;
        let y = nibble(opcode, 2)?;
        let n = nibble(opcode, 3)?;
        let nn = byte(opcode, 1)?;
        let nnn = address(opcode);

        let instruction = match nibble(opcode, 0)? {
            0x0 => match nnn {
                0x0E0 => Clear,
                0x0EE => Return,
                _ => Sys(nnn),
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipEqImm(x, nn),
            0x4 => SkipNeqImm(x, nn),
            0x5 if n == 0x0 => SkipEqReg(x, y),
            0x6 => LoadImm(x, nn),
            0x7 => AddImm(x, nn),
            0x8 => match n {
                0x0 => LoadReg(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddReg(x, y),
                0x5 => SubXY(x, y),
                0x6 => ShiftRight(x, y),
                0x7 => SubYX(x, y),
                0xE => ShiftLeft(x, y),
                _ => return Err(Chip8Error::UnknownOpcode { opcode, addr }),
            },
            0x9 if n == 0x0 => SkipNeqReg(x, y),
            0xA => LoadIndex(nnn),
            0xB => JumpOffset(nnn),
            0xC => Random(x, nn),
            0xD => Draw(x, y, n),
            0xE => match nn {
                0x9E => SkipKey(x),
                0xA1 => SkipNotKey(x),
                _ => return Err(Chip8Error::UnknownOpcode { opcode, addr }),
            },
            0xF => match nn {
                0x07 => LoadDelay(x),
                0x0A => WaitKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1E => AddIndex(x),
                0x29 => LoadGlyph(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegs(x),
                0x65 => LoadRegs(x),
                _ => return Err(Chip8Error::UnknownOpcode { opcode, addr }),
            },
            _ => return Err(Chip8Error::UnknownOpcode { opcode, addr }),
        };
        Ok(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Sys(a) => write!(f, "SYS 0x{:03x}", a),
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP 0x{:03x}", a),
            Call(a) => write!(f, "CALL 0x{:03x}", a),
            SkipEqImm(x, nn) => write!(f, "SE V{:x}, 0x{:02x}", x, nn),
            SkipNeqImm(x, nn) => write!(f, "SNE V{:x}, 0x{:02x}", x, nn),
            SkipEqReg(x, y) => write!(f, "SE V{:x}, V{:x}", x, y),
            LoadImm(x, nn) => write!(f, "LD V{:x}, 0x{:02x}", x, nn),
            AddImm(x, nn) => write!(f, "ADD V{:x}, 0x{:02x}", x, nn),
            LoadReg(x, y) => write!(f, "LD V{:x}, V{:x}", x, y),
            Or(x, y) => write!(f, "OR V{:x}, V{:x}", x, y),
            And(x, y) => write!(f, "AND V{:x}, V{:x}", x, y),
            Xor(x, y) => write!(f, "XOR V{:x}, V{:x}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:x}, V{:x}", x, y),
            SubXY(x, y) => write!(f, "SUB V{:x}, V{:x}", x, y),
            ShiftRight(x, y) => write!(f, "SHR V{:x}, V{:x}", x, y),
            SubYX(x, y) => write!(f, "SUBN V{:x}, V{:x}", x, y),
            ShiftLeft(x, y) => write!(f, "SHL V{:x}, V{:x}", x, y),
            SkipNeqReg(x, y) => write!(f, "SNE V{:x}, V{:x}", x, y),
            LoadIndex(a) => write!(f, "LD I, 0x{:03x}", a),
            JumpOffset(a) => write!(f, "JP V0, 0x{:03x}", a),
            Random(x, nn) => write!(f, "RND V{:x}, 0x{:02x}", x, nn),
            Draw(x, y, n) => write!(f, "DRW V{:x}, V{:x}, {}", x, y, n),
            SkipKey(x) => write!(f, "SKP V{:x}", x),
            SkipNotKey(x) => write!(f, "SKNP V{:x}", x),
            LoadDelay(x) => write!(f, "LD V{:x}, DT", x),
            WaitKey(x) => write!(f, "LD V{:x}, K", x),
            SetDelay(x) => write!(f, "LD DT, V{:x}", x),
            SetSound(x) => write!(f, "LD ST, V{:x}", x),
            AddIndex(x) => write!(f, "ADD I, V{:x}", x),
            LoadGlyph(x) => write!(f, "LD F, V{:x}", x),
            StoreBcd(x) => write!(f, "LD B, V{:x}", x),
            StoreRegs(x) => write!(f, "LD [I], V{:x}", x),
            LoadRegs(x) => write!(f, "LD V{:x}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(opcode: u16) -> Instruction {
        Instruction::decode(opcode, 0x200).unwrap()
    }

    #[test]
    fn test_decode_system() {
        assert_eq!(decode(0x00E0), Instruction::Clear);
        assert_eq!(decode(0x00EE), Instruction::Return);
        assert_eq!(decode(0x0123), Instruction::Sys(0x123));
    }

    #[test]
    fn test_decode_operands() {
        assert_eq!(decode(0x1ABC), Instruction::Jump(0xABC));
        assert_eq!(decode(0x3A42), Instruction::SkipEqImm(0xA, 0x42));
        assert_eq!(decode(0x8AB4), Instruction::AddReg(0xA, 0xB));
        assert_eq!(decode(0x8ABE), Instruction::ShiftLeft(0xA, 0xB));
        assert_eq!(decode(0xB2F0), Instruction::JumpOffset(0x2F0));
        assert_eq!(decode(0xD125), Instruction::Draw(0x1, 0x2, 0x5));
        assert_eq!(decode(0xE39E), Instruction::SkipKey(0x3));
        assert_eq!(decode(0xF70A), Instruction::WaitKey(0x7));
        assert_eq!(decode(0xFF65), Instruction::LoadRegs(0xF));
    }

    #[test]
    fn test_decode_unknown() {
        for opcode in [0x5121u16, 0x8128, 0x912F, 0xE1FF, 0xF1FF] {
            assert_eq!(
                Instruction::decode(opcode, 0x2A0),
                Err(Chip8Error::UnknownOpcode {
                    opcode,
                    addr: 0x2A0
                })
            );
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(decode(0x00E0).to_string(), "CLS");
        assert_eq!(decode(0x2208).to_string(), "CALL 0x208");
        assert_eq!(decode(0x6A0F).to_string(), "LD Va, 0x0f");
        assert_eq!(decode(0xD01F).to_string(), "DRW V0, V1, 15");
        assert_eq!(decode(0xF533).to_string(), "LD B, V5");
    }
}

// Built-in program: shows the hex digits 0-F one after another, half a
// second each, using the font glyphs and the delay timer.

pub static PROGRAM: [u8; 32] = [
    0x00, 0xE0, // 0x200: CLS
    0x60, 0x00, // 0x202: LD V0, 0x00     digit
    0x61, 0x1C, // 0x204: LD V1, 0x1c     x
    0x62, 0x0D, // 0x206: LD V2, 0x0d     y
    0xF0, 0x29, // 0x208: LD F, V0
    0xD1, 0x25, // 0x20a: DRW V1, V2, 5
    0x63, 0x1E, // 0x20c: LD V3, 0x1e
    0xF3, 0x15, // 0x20e: LD DT, V3
    0xF3, 0x07, // 0x210: LD V3, DT
    0x33, 0x00, // 0x212: SE V3, 0x00
    0x12, 0x10, // 0x214: JP 0x210
    0xD1, 0x25, // 0x216: DRW V1, V2, 5   erase
    0x70, 0x01, // 0x218: ADD V0, 0x01
    0x40, 0x10, // 0x21a: SNE V0, 0x10
    0x60, 0x00, // 0x21c: LD V0, 0x00
    0x12, 0x08, // 0x21e: JP 0x208
];

#[cfg(test)]
mod tests {
    use super::*;
    use chip_8_interp_core::{Chip8Builder, DisplaySize, FrameBuffer, Instruction};

    #[test]
    fn test_decodes() {
        for (i, word) in PROGRAM.chunks(2).enumerate() {
            let opcode = u16::from_be_bytes([word[0], word[1]]);
            assert!(Instruction::decode(opcode, 0x200 + 2 * i as u16).is_ok());
        }
    }

    #[test]
    fn test_cycles_digits() {
        // Arrange: timers ticked by hand
        let mut chip = Chip8Builder::new()
            .with_rom(PROGRAM.to_vec())
            .with_timer_gate(false)
            .build(FrameBuffer::new(DisplaySize::STANDARD))
            .unwrap();

        // Act: run until the first digit is drawn and the delay is armed
        for _ in 0..8 {
            chip.step().unwrap();
        }
        assert!(chip.display().lit(13, 28));
        assert_eq!(chip.delay_timer(), 30);
        let zero = chip.display().lit_count();

        // Act: let the delay expire, then draw the next digit
        for _ in 0..30 {
            chip.tick_timers();
        }
        for _ in 0..8 {
            chip.step().unwrap();
        }

        // Assert: "1" replaced "0"
        assert_eq!(chip.registers()[0], 1);
        assert_ne!(chip.display().lit_count(), zero);
        assert_eq!(chip.pc(), 0x20C);
    }
}

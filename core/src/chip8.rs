// CHIP-8 interpreter
//
// Useful links:
// * [Guide to making a CHIP-8 emulator](https://tobiasvl.github.io/blog/write-a-chip-8-emulator/)
// * [Building a CHIP-8 Emulator](https://austinmorlan.com/posts/chip8_emulator/)
// * [high-level assembler for the Chip8 virtual machine](https://github.com/JohnEarnest/Octo/blob/gh-pages/js/emulator.js)
//

use std::time::Instant;

use log::{debug, trace};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{
    compat::{Chip8Mode, Compatibility, VerticalEdge},
    font::{CHIP48_FONT, FONT_SIZE, GLYPH_HEIGHT},
    opcode::address,
    stack::{CallStack, DEFAULT_STACK_SIZE},
    timer::{TimerGate, Timers},
    Chip8Error, Display, DisplaySize, Instruction,
};

pub const MEMORY_SIZE: usize = 0x1000;
pub const FONT_ADDR: u16 = 0x050;
pub const PROGRAM_ADDR: u16 = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_ADDR as usize;

/// Both timers start here unless configured otherwise, so a program that
/// never sets them does not see them already expired.
pub const DEFAULT_TIMER_VALUE: u8 = 255;

const ADDR_MASK: u16 = 0x0FFF;
const FLAG: usize = 0xF;

#[derive(Debug, Clone)]
pub struct Chip8Builder {
    /// ROM
    rom: Vec<u8>,
    /// Font sprite
    font: Option<Vec<u8>>,
    // PRNG Seed
    rng_seed: Option<u64>,
    /// Compatibility policy
    compat: Compatibility,
    /// Call stack depth
    stack_size: usize,
    /// Initial timer values
    timers: Timers,
    /// Decrement timers from `step()` at 60Hz wall-clock time
    timer_gate: bool,
}

pub struct Chip8<D: Display> {
    /// General purpose registers
    regs: [u8; 16],
    /// Index register
    index: u16,
    /// Program counter
    pc: u16,
    /// Call stack
    stack: CallStack,
    /// Delay and sound timers
    timers: Timers,
    /// Wall-clock gate for the timers, `None` when ticked externally
    gate: Option<TimerGate>,
    /// Memory
    memory: Box<[u8; MEMORY_SIZE]>,
    /// Pixel grid and keypad
    display: D,
    /// Display dimensions, fixed at construction
    size: DisplaySize,
    /// Compatibility policy
    compat: Compatibility,
    /// PRNG Generator
    rng: StdRng,
}

impl Chip8Builder {
    pub fn new() -> Chip8Builder {
        Chip8Builder {
            rom: Vec::new(),
            font: None,
            rng_seed: None,
            compat: Compatibility::default(),
            stack_size: DEFAULT_STACK_SIZE,
            timers: Timers::new(DEFAULT_TIMER_VALUE, DEFAULT_TIMER_VALUE),
            timer_gate: true,
        }
    }

    pub fn with_rom(mut self, rom: Vec<u8>) -> Self {
        self.rom = rom;
        self
    }

    pub fn with_font(mut self, font: Vec<u8>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_mode(mut self, mode: Chip8Mode) -> Self {
        self.compat.mode = mode;
        self
    }

    pub fn with_vertical_edge(mut self, vertical: VerticalEdge) -> Self {
        self.compat.vertical = vertical;
        self
    }

    pub fn with_compatibility(mut self, compat: Compatibility) -> Self {
        self.compat = compat;
        self
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub fn with_initial_timers(mut self, delay: u8, sound: u8) -> Self {
        self.timers = Timers::new(delay, sound);
        self
    }

    /// When disabled the driver must call [`Chip8::tick_timers`] at 60Hz itself.
    pub fn with_timer_gate(mut self, enabled: bool) -> Self {
        self.timer_gate = enabled;
        self
    }

    /// Builds a machine attached to `display`, whose size becomes the size of
    /// the machine's pixel grid.
    pub fn build<D: Display>(&self, display: D) -> Result<Chip8<D>, Chip8Error> {
        let size = display.size();
        if size.width == 0 || size.height == 0 {
            return Err(Chip8Error::InvalidDisplaySize {
                width: size.width,
                height: size.height,
            });
        }

        let font = self.font.as_deref().unwrap_or(&CHIP48_FONT[..]);
        if font.len() > FONT_SIZE {
            return Err(Chip8Error::FontTooLarge {
                size: font.len(),
                max: FONT_SIZE,
            });
        }

        if self.rom.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                size: self.rom.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        // Create memory
        let mut memory = Box::new([0u8; MEMORY_SIZE]);

        // Copy font to memory
        let font_start = FONT_ADDR as usize;
        memory[font_start..font_start + font.len()].copy_from_slice(font);

        // Copy rom to memory
        let rom_start = PROGRAM_ADDR as usize;
        memory[rom_start..rom_start + self.rom.len()].copy_from_slice(&self.rom);

        // Pseudo random number generator
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let gate = if self.timer_gate {
            Some(TimerGate::new(Instant::now()))
        } else {
            None
        };

        debug!(
            "built machine: {} byte program, {}x{} display, {:?}, stack depth {}",
            self.rom.len(),
            size.width,
            size.height,
            self.compat,
            self.stack_size
        );

        Ok(Chip8 {
            regs: [0u8; 16],
            index: 0,
            pc: PROGRAM_ADDR,
            stack: CallStack::new(self.stack_size),
            timers: self.timers,
            gate,
            memory,
            display,
            size,
            compat: self.compat,
            rng,
        })
    }
}

impl Default for Chip8Builder {
    fn default() -> Self {
        Chip8Builder::new()
    }
}

impl<D: Display> Chip8<D> {
    /// Fetches, decodes and executes one instruction, then applies any timer
    /// ticks that came due. The first error ends the step; effects already
    /// applied by the instruction are not rolled back.
    pub fn step(&mut self) -> Result<(), Chip8Error> {
        // Fetch
        let addr = self.pc;
        let opcode = self.read_u16_be(addr);
        self.pc = (self.pc + 2) & ADDR_MASK;

        if let Some(gate) = self.gate.as_mut() {
            let due = gate.due_ticks(Instant::now());
            self.timers.tick_n(due);
        }

        // Decode
        let instruction = Instruction::decode(opcode, addr)?;
        trace!("0x{:03x}: {:04x} {}", addr, opcode, instruction);

        // Execute
        self.execute(instruction)
    }

    /// One 60Hz timer tick, for drivers that pace the timers themselves.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.regs
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn stack(&self) -> &[u16] {
        self.stack.as_slice()
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    /// Whether a tone should currently be playing.
    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory[..]
    }

    pub fn compatibility(&self) -> Compatibility {
        self.compat
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Tells the display to release its resources.
    pub fn terminate(&mut self) {
        self.display.terminate();
    }

    pub fn into_display(self) -> D {
        self.display
    }

    fn execute(&mut self, instruction: Instruction) -> Result<(), Chip8Error> {
        use Instruction::*;

        match instruction {
            Sys(addr) => {
                debug!("ignoring machine routine call to 0x{:03x}", addr);
                Ok(())
            }
            Clear => self.clear_screen(),
            Return => self.ret(),
            Jump(addr) => {
                self.pc = addr;
                Ok(())
            }
            Call(addr) => self.call(addr),
            SkipEqImm(x, nn) => {
                self.skip_if(self.reg(x) == nn);
                Ok(())
            }
            SkipNeqImm(x, nn) => {
                self.skip_if(self.reg(x) != nn);
                Ok(())
            }
            SkipEqReg(x, y) => {
                self.skip_if(self.reg(x) == self.reg(y));
                Ok(())
            }
            SkipNeqReg(x, y) => {
                self.skip_if(self.reg(x) != self.reg(y));
                Ok(())
            }
            LoadImm(x, nn) => {
                self.set_reg(x, nn);
                Ok(())
            }
            AddImm(x, nn) => {
                self.set_reg(x, self.reg(x).wrapping_add(nn));
                Ok(())
            }
            LoadReg(x, y) => {
                self.set_reg(x, self.reg(y));
                Ok(())
            }
            Or(x, y) => {
                self.set_reg(x, self.reg(x) | self.reg(y));
                Ok(())
            }
            And(x, y) => {
                self.set_reg(x, self.reg(x) & self.reg(y));
                Ok(())
            }
            Xor(x, y) => {
                self.set_reg(x, self.reg(x) ^ self.reg(y));
                Ok(())
            }
            AddReg(x, y) => {
                let (sum, carry) = self.reg(x).overflowing_add(self.reg(y));
                self.set_reg_with_flag(x, sum, carry as u8);
                Ok(())
            }
            SubXY(x, y) => {
                let (diff, borrow) = self.reg(x).overflowing_sub(self.reg(y));
                self.set_reg_with_flag(x, diff, (!borrow) as u8);
                Ok(())
            }
            SubYX(x, y) => {
                let (diff, borrow) = self.reg(y).overflowing_sub(self.reg(x));
                self.set_reg_with_flag(x, diff, (!borrow) as u8);
                Ok(())
            }
            ShiftRight(x, y) => {
                let value = self.shift_source(x, y);
                self.set_reg_with_flag(x, value >> 1, value & 0x01);
                Ok(())
            }
            ShiftLeft(x, y) => {
                let value = self.shift_source(x, y);
                self.set_reg_with_flag(x, value << 1, value >> 7);
                Ok(())
            }
            LoadIndex(addr) => {
                self.index = addr;
                Ok(())
            }
            JumpOffset(operand) => {
                self.jump_with_offset(operand);
                Ok(())
            }
            Random(x, nn) => {
                let n = self.rng.next_u32() as u8;
                self.set_reg(x, n & nn);
                Ok(())
            }
            Draw(x, y, n) => self.draw(x, y, n),
            SkipKey(x) => {
                let key = self.display.poll_key();
                self.skip_if(key == Some(self.reg(x)));
                Ok(())
            }
            SkipNotKey(x) => {
                let key = self.display.poll_key();
                self.skip_if(key != Some(self.reg(x)));
                Ok(())
            }
            LoadDelay(x) => {
                self.set_reg(x, self.timers.delay);
                Ok(())
            }
            WaitKey(x) => {
                match self.display.poll_key() {
                    Some(key) => self.set_reg(x, key & 0xF),
                    // Re-run this instruction on the next step
                    None => self.pc = self.pc.wrapping_sub(2) & ADDR_MASK,
                }
                Ok(())
            }
            SetDelay(x) => {
                self.timers.delay = self.reg(x);
                Ok(())
            }
            SetSound(x) => {
                self.timers.sound = self.reg(x);
                Ok(())
            }
            AddIndex(x) => {
                self.index = (self.index + self.reg(x) as u16) & ADDR_MASK;
                Ok(())
            }
            LoadGlyph(x) => {
                self.index = FONT_ADDR + GLYPH_HEIGHT * (self.reg(x) & 0xF) as u16;
                Ok(())
            }
            StoreBcd(x) => {
                let val = self.reg(x);
                self.write_u8(self.index, val / 100);
                self.write_u8(self.index + 1, val / 10 % 10);
                self.write_u8(self.index + 2, val % 10);
                Ok(())
            }
            StoreRegs(x) => {
                for i in 0..=x {
                    self.write_u8(self.index + i as u16, self.reg(i));
                }
                Ok(())
            }
            LoadRegs(x) => {
                for i in 0..=x {
                    let value = self.read_u8(self.index + i as u16);
                    self.set_reg(i, value);
                }
                Ok(())
            }
        }
    }

    // 00E0: Clear screen
    fn clear_screen(&mut self) -> Result<(), Chip8Error> {
        for row in 0..self.size.height {
            for col in 0..self.size.width {
                self.display.set_pixel(row, col, false)?;
            }
        }
        self.display.refresh()?;
        Ok(())
    }

    // 00EE: Return subroutine from stack
    fn ret(&mut self) -> Result<(), Chip8Error> {
        self.pc = self.stack.pop()?;
        Ok(())
    }

    // 2NNN: Call subroutine at memory location NNN
    fn call(&mut self, addr: u16) -> Result<(), Chip8Error> {
        self.stack.push(self.pc)?;
        self.pc = addr;
        Ok(())
    }

    // 8XY6/8XYE: COSMAC VIP shifts VY into VX, later interpreters shift VX in place
    fn shift_source(&self, x: u8, y: u8) -> u8 {
        match self.compat.mode {
            Chip8Mode::COSMAC_VIP => self.reg(y),
            Chip8Mode::SUPER_CHIP => self.reg(x),
        }
    }

    // BNNN: Jump to NNN + V0 (COSMAC VIP)
    // BXNN: Jump to NN + VX (CHIP-48 and SUPER-CHIP)
    fn jump_with_offset(&mut self, operand: u16) {
        let target = match self.compat.mode {
            Chip8Mode::COSMAC_VIP => operand + self.reg(0x0) as u16,
            Chip8Mode::SUPER_CHIP => {
                let x = (operand >> 8) as u8;
                (operand & 0x00FF) + self.reg(x) as u16
            }
        };
        self.pc = target & ADDR_MASK;
    }

    // DXYN: Display - draw an N pixels tall sprite from the memory location that the I index register
    // is holding to the screen, at the horizontal X coordinate in VX and the Y coordinate in VY
    fn draw(&mut self, x: u8, y: u8, n: u8) -> Result<(), Chip8Error> {
        let width = self.size.width;
        let height = self.size.height;

        // Origin where we start to draw, read before VF is cleared
        let ox = self.reg(x) as usize % width;
        let oy = self.reg(y) as usize % height;

        // Reset collision flag
        self.regs[FLAG] = 0;

        for row in 0..n as usize {
            let py = match self.compat.sprite_row(oy, row, height) {
                Some(py) => py,
                None => continue,
            };

            // Read row(8-bit) of sprite data from memory
            let data = self.read_u8(self.index + row as u16);

            for column in 0..8 {
                let px = (ox + column) % width;
                let sprite = (data >> (7 - column)) & 1 == 1;

                let current = self.display.pixel(py, px)?;
                self.display.set_pixel(py, px, current ^ sprite)?;
                self.regs[FLAG] |= (current && sprite) as u8;
            }
        }

        self.display.refresh()?;
        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = (self.pc + 2) & ADDR_MASK;
        }
    }

    fn reg(&self, reg: u8) -> u8 {
        self.regs[reg as usize]
    }

    fn set_reg(&mut self, reg: u8, value: u8) {
        self.regs[reg as usize] = value;
    }

    // Result first, flag last: when X is F the flag is what remains
    fn set_reg_with_flag(&mut self, reg: u8, value: u8, flag: u8) {
        self.regs[reg as usize] = value;
        self.regs[FLAG] = flag;
    }

    fn read_u8(&self, addr: u16) -> u8 {
        self.memory[address(addr) as usize]
    }

    fn read_u16_be(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_u8(addr), self.read_u8(addr + 1)])
    }

    fn write_u8(&mut self, addr: u16, data: u8) {
        self.memory[address(addr) as usize] = data;
    }
}

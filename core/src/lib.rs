//! CHIP-8 interpreter core.
//!
//! A [`Chip8`] machine is built with a [`Chip8Builder`] and attached to a
//! [`Display`] adapter, which owns the pixel grid and the keypad. The driver
//! calls [`Chip8::step`] at whatever instruction rate it wants.

mod chip8;
mod color;
mod compat;
mod display;
mod error;
mod font;
mod framebuffer;
mod instruction;
mod opcode;
mod stack;
mod timer;

pub use chip8::{
    Chip8, Chip8Builder, DEFAULT_TIMER_VALUE, FONT_ADDR, MAX_PROGRAM_SIZE, MEMORY_SIZE,
    PROGRAM_ADDR,
};
pub use color::{
    Chip8Color, Chip8ColorParseError, DEFAULT_BACKGROUND_COLOR, DEFAULT_FOREGROUND_COLOR,
};
pub use compat::{Chip8Mode, Compatibility, VerticalEdge};
pub use display::{Display, DisplaySize};
pub use error::{Chip8Error, DisplayError};
pub use font::{parse_font_text, BuiltinFont, FontParseError, FONT_SIZE};
pub use framebuffer::FrameBuffer;
pub use instruction::Instruction;
pub use opcode::{address, byte, nibble};
pub use stack::{CallStack, DEFAULT_STACK_SIZE};
pub use timer::{TimerGate, Timers, TIMER_HZ};

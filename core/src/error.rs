use thiserror::Error;

/// Everything that can stop a [`Chip8`](crate::Chip8) from being built or
/// from executing an instruction. None of these are retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("stack underflow: return executed with an empty call stack")]
    StackUnderflow,

    #[error("stack overflow: call executed with {depth} return addresses on the stack")]
    StackOverflow { depth: usize },

    #[error("pixel access out of bounds at row {row}, column {col}")]
    OutOfBounds { row: usize, col: usize },

    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("font is too large ({size} bytes), max size is {max} bytes")]
    FontTooLarge { size: usize, max: usize },

    #[error("display size {width}x{height} is invalid")]
    InvalidDisplaySize { width: usize, height: usize },

    #[error("opcode field index {index} is out of range (max {max})")]
    OutOfRange { index: u8, max: u8 },

    #[error("unknown opcode {opcode:#06X} at {addr:#05X}")]
    UnknownOpcode { opcode: u16, addr: u16 },

    #[error("display backend failure: {0}")]
    Display(String),
}

/// Failures reported by a [`Display`](crate::Display) implementation.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("pixel ({row}, {col}) is outside the display grid")]
    OutOfBounds { row: usize, col: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<DisplayError> for Chip8Error {
    fn from(err: DisplayError) -> Self {
        match err {
            DisplayError::OutOfBounds { row, col } => Chip8Error::OutOfBounds { row, col },
            DisplayError::Io(err) => Chip8Error::Display(err.to_string()),
        }
    }
}

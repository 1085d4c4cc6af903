use crate::DisplayError;

/// Display grid dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplaySize {
    pub width: usize,
    pub height: usize,
}

impl DisplaySize {
    /// 64x32, the original CHIP-8 resolution.
    pub const STANDARD: DisplaySize = DisplaySize::new(64, 32);
    /// 128x64, the SUPER-CHIP high resolution.
    pub const EXTENDED: DisplaySize = DisplaySize::new(128, 64);

    pub const fn new(width: usize, height: usize) -> DisplaySize {
        DisplaySize { width, height }
    }

    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl Default for DisplaySize {
    fn default() -> Self {
        DisplaySize::STANDARD
    }
}

/// Pixel grid and keypad the interpreter draws to and reads from.
///
/// Implementations own the pixel storage; the interpreter only ever touches
/// it through these calls. Every call is synchronous and must complete before
/// it returns, though key state may be collected on another thread.
pub trait Display {
    /// Highest addressable row.
    fn max_row(&self) -> usize;

    /// Highest addressable column.
    fn max_col(&self) -> usize;

    /// Whether the pixel at `(row, col)` is lit.
    fn pixel(&self, row: usize, col: usize) -> Result<bool, DisplayError>;

    fn set_pixel(&mut self, row: usize, col: usize, lit: bool) -> Result<(), DisplayError>;

    /// Flush the logical grid to whatever the adapter draws on.
    fn refresh(&mut self) -> Result<(), DisplayError>;

    /// Key currently held down (0x0-0xF), if any. Never blocks.
    fn poll_key(&mut self) -> Option<u8>;

    /// Release backend resources.
    fn terminate(&mut self) {}

    fn size(&self) -> DisplaySize {
        DisplaySize::new(self.max_col() + 1, self.max_row() + 1)
    }
}

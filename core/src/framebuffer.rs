use crate::{
    color::{DEFAULT_BACKGROUND_COLOR, DEFAULT_FOREGROUND_COLOR},
    Chip8Color, Display, DisplayError, DisplaySize,
};

/// In-memory [`Display`]: a row-major grid of colored pixels plus a single
/// held key. Concrete frontends wrap it for storage; tests use it directly.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    size: DisplaySize,
    cells: Vec<bool>,
    pixels: Vec<Chip8Color>,
    foreground: Chip8Color,
    background: Chip8Color,
    dirty: bool,
    refreshes: usize,
    key: Option<u8>,
}

impl FrameBuffer {
    pub fn new(size: DisplaySize) -> FrameBuffer {
        FrameBuffer::with_colors(size, DEFAULT_FOREGROUND_COLOR, DEFAULT_BACKGROUND_COLOR)
    }

    pub fn with_colors(
        size: DisplaySize,
        foreground: Chip8Color,
        background: Chip8Color,
    ) -> FrameBuffer {
        FrameBuffer {
            size,
            cells: vec![false; size.pixel_count()],
            pixels: vec![background; size.pixel_count()],
            foreground,
            background,
            dirty: true,
            refreshes: 0,
            key: None,
        }
    }

    pub fn width(&self) -> usize {
        self.size.width
    }

    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Whether a refresh was requested since the last [`clear_dirty`](Self::clear_dirty).
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// How many times the interpreter asked for a redraw.
    pub fn refreshes(&self) -> usize {
        self.refreshes
    }

    /// Pixel data as RGBX8888 bytes, `width * 4` bytes per row.
    pub fn buffer(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels[..])
    }

    /// Whether `(row, col)` is lit; out of range pixels read as unlit.
    pub fn lit(&self, row: usize, col: usize) -> bool {
        self.index(row, col)
            .map(|idx| self.cells[idx])
            .unwrap_or(false)
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn press_key(&mut self, key: u8) {
        self.key = Some(key & 0xF);
    }

    pub fn release_key(&mut self) {
        self.key = None;
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.size.height && col < self.size.width {
            Some(row * self.size.width + col)
        } else {
            None
        }
    }
}

impl Display for FrameBuffer {
    fn max_row(&self) -> usize {
        self.size.height - 1
    }

    fn max_col(&self) -> usize {
        self.size.width - 1
    }

    fn pixel(&self, row: usize, col: usize) -> Result<bool, DisplayError> {
        let idx = self
            .index(row, col)
            .ok_or(DisplayError::OutOfBounds { row, col })?;
        Ok(self.cells[idx])
    }

    fn set_pixel(&mut self, row: usize, col: usize, lit: bool) -> Result<(), DisplayError> {
        let idx = self
            .index(row, col)
            .ok_or(DisplayError::OutOfBounds { row, col })?;
        self.cells[idx] = lit;
        self.pixels[idx] = if lit { self.foreground } else { self.background };
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), DisplayError> {
        self.dirty = true;
        self.refreshes += 1;
        Ok(())
    }

    fn poll_key(&mut self) -> Option<u8> {
        self.key
    }

    fn size(&self) -> DisplaySize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let fb = FrameBuffer::new(DisplaySize::STANDARD);
        assert_eq!(fb.max_row(), 31);
        assert_eq!(fb.max_col(), 63);
        assert_eq!(fb.size(), DisplaySize::STANDARD);
    }

    #[test]
    fn test_set_and_get_pixel() {
        let mut fb = FrameBuffer::new(DisplaySize::EXTENDED);
        fb.set_pixel(63, 127, true).unwrap();
        assert!(fb.pixel(63, 127).unwrap());
        assert!(!fb.pixel(0, 0).unwrap());
        assert_eq!(fb.lit_count(), 1);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut fb = FrameBuffer::new(DisplaySize::STANDARD);
        assert!(matches!(
            fb.pixel(32, 0),
            Err(DisplayError::OutOfBounds { row: 32, col: 0 })
        ));
        assert!(matches!(
            fb.set_pixel(0, 64, true),
            Err(DisplayError::OutOfBounds { row: 0, col: 64 })
        ));
    }

    #[test]
    fn test_buffer_uses_colors() {
        let fg = Chip8Color::new(0x11, 0x22, 0x33);
        let bg = Chip8Color::new(0, 0, 0);
        let mut fb = FrameBuffer::with_colors(DisplaySize::new(2, 1), fg, bg);
        fb.set_pixel(0, 1, true).unwrap();
        assert_eq!(fb.buffer(), &[0, 0, 0, 0, 0, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_refresh_marks_dirty() {
        let mut fb = FrameBuffer::new(DisplaySize::STANDARD);
        fb.clear_dirty();
        assert!(!fb.dirty());
        fb.refresh().unwrap();
        assert!(fb.dirty());
        assert_eq!(fb.refreshes(), 1);
    }

    #[test]
    fn test_keys() {
        let mut fb = FrameBuffer::new(DisplaySize::STANDARD);
        assert_eq!(fb.poll_key(), None);
        fb.press_key(0x1A);
        assert_eq!(fb.poll_key(), Some(0xA));
        fb.release_key();
        assert_eq!(fb.poll_key(), None);
    }
}

use std::{
    io::{self, Stdout, Write},
    time::{Duration, Instant},
};

use anyhow::Result;
use chip_8_interp_core::{Chip8Color, Display, DisplayError, DisplaySize, FrameBuffer};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, warn};

use crate::Frontend;

/// Terminals only report presses, so a key counts as held for this long.
const KEY_HOLD: Duration = Duration::from_millis(150);

/// Left-hand side of a QWERTY keyboard laid out like the COSMAC VIP hex keypad.
const KEYMAP: [(char, u8); 16] = [
    ('1', 0x1),
    ('2', 0x2),
    ('3', 0x3),
    ('4', 0xC),
    ('q', 0x4),
    ('w', 0x5),
    ('e', 0x6),
    ('r', 0xD),
    ('a', 0x7),
    ('s', 0x8),
    ('d', 0x9),
    ('f', 0xE),
    ('z', 0xA),
    ('x', 0x0),
    ('c', 0xB),
    ('v', 0xF),
];

pub fn keypad(c: char) -> Option<u8> {
    let c = c.to_ascii_lowercase();
    KEYMAP.iter().find(|(k, _)| *k == c).map(|(_, v)| *v)
}

/// Draws half-block characters, two pixel rows per terminal line.
fn cell(top: bool, bottom: bool) -> char {
    match (top, bottom) {
        (true, true) => '█',
        (true, false) => '▀',
        (false, true) => '▄',
        (false, false) => ' ',
    }
}

fn color(c: Chip8Color) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Runs `undo` when `result` is an error, and passes the original error on.
fn rollback<T>(result: io::Result<T>, undo: impl FnOnce() -> io::Result<()>) -> io::Result<T> {
    if result.is_err() {
        if let Err(err) = undo() {
            warn!("failed to undo terminal setup: {}", err);
        }
    }
    result
}

pub struct TerminalDisplay {
    fb: FrameBuffer,
    out: Stdout,
    foreground: Chip8Color,
    background: Chip8Color,
    held: Option<(u8, Instant)>,
    quit: bool,
    active: bool,
}

impl TerminalDisplay {
    /// Switches the terminal to raw mode on the alternate screen.
    pub fn new(
        size: DisplaySize,
        foreground: Chip8Color,
        background: Chip8Color,
    ) -> io::Result<TerminalDisplay> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        rollback(
            execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All)),
            terminal::disable_raw_mode,
        )?;

        Ok(TerminalDisplay {
            fb: FrameBuffer::with_colors(size, foreground, background),
            out,
            foreground,
            background,
            held: None,
            quit: false,
            active: true,
        })
    }

    fn pump_events(&mut self) -> io::Result<()> {
        while poll(Duration::ZERO)? {
            if let Event::Key(key) = read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, event: KeyEvent) {
        let ctrl_c = event.code == KeyCode::Char('c')
            && event.modifiers.contains(KeyModifiers::CONTROL);
        if event.code == KeyCode::Esc || ctrl_c {
            self.quit = true;
            return;
        }

        let KeyCode::Char(c) = event.code else {
            return;
        };
        let Some(key) = keypad(c) else {
            debug!("unmapped key {:?}", c);
            return;
        };

        match event.kind {
            KeyEventKind::Release => {
                if self.held.is_some_and(|(held, _)| held == key) {
                    self.held = None;
                }
            }
            _ => self.held = Some((key, Instant::now())),
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let width = self.fb.width();
        let height = self.fb.height();

        queue!(
            self.out,
            SetForegroundColor(color(self.foreground)),
            SetBackgroundColor(color(self.background))
        )?;

        for row in (0..height).step_by(2) {
            let line: String = (0..width)
                .map(|col| cell(self.fb.lit(row, col), self.fb.lit(row + 1, col)))
                .collect();
            queue!(self.out, MoveTo(0, (row / 2) as u16), Print(line))?;
        }

        queue!(self.out, ResetColor)?;
        self.out.flush()
    }
}

impl Display for TerminalDisplay {
    fn max_row(&self) -> usize {
        self.fb.max_row()
    }

    fn max_col(&self) -> usize {
        self.fb.max_col()
    }

    fn pixel(&self, row: usize, col: usize) -> Result<bool, DisplayError> {
        self.fb.pixel(row, col)
    }

    fn set_pixel(&mut self, row: usize, col: usize, lit: bool) -> Result<(), DisplayError> {
        self.fb.set_pixel(row, col, lit)
    }

    fn refresh(&mut self) -> Result<(), DisplayError> {
        self.fb.refresh()
    }

    fn poll_key(&mut self) -> Option<u8> {
        if let Err(err) = self.pump_events() {
            warn!("failed to read terminal input: {}", err);
        }

        match self.held {
            Some((key, pressed)) if pressed.elapsed() < KEY_HOLD => Some(key),
            _ => {
                self.held = None;
                None
            }
        }
    }

    fn terminate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Err(err) = execute!(self.out, ResetColor, Show, LeaveAlternateScreen) {
            warn!("failed to restore terminal screen: {}", err);
        }
        if let Err(err) = terminal::disable_raw_mode() {
            warn!("failed to leave raw mode: {}", err);
        }
    }

    fn size(&self) -> DisplaySize {
        self.fb.size()
    }
}

impl Frontend for TerminalDisplay {
    fn quit_requested(&mut self) -> bool {
        if let Err(err) = self.pump_events() {
            warn!("failed to read terminal input: {}", err);
        }
        self.quit
    }

    fn present(&mut self) -> Result<()> {
        if self.fb.dirty() {
            self.render()?;
            self.fb.clear_dirty();
        }
        Ok(())
    }

    fn set_tone(&mut self, on: bool) -> Result<()> {
        if on {
            execute!(self.out, Print('\x07'))?;
        }
        Ok(())
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad() {
        assert_eq!(keypad('1'), Some(0x1));
        assert_eq!(keypad('4'), Some(0xC));
        assert_eq!(keypad('X'), Some(0x0));
        assert_eq!(keypad('v'), Some(0xF));
        assert_eq!(keypad('p'), None);
    }

    #[test]
    fn test_keymap_covers_keypad() {
        let mut keys: Vec<u8> = KEYMAP.iter().map(|(_, v)| *v).collect();
        keys.sort();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_screen_setup_is_undone() {
        // Arrange
        let mut out = BrokenPipe;
        let mut undone = false;

        // Act
        let result = rollback(execute!(out, EnterAlternateScreen, Hide), || {
            undone = true;
            Ok(())
        });

        // Assert: error kept, raw mode left
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(undone);
    }

    #[test]
    fn test_successful_setup_is_kept() {
        let mut out = Vec::new();
        let mut undone = false;

        let result = rollback(execute!(out, Hide), || {
            undone = true;
            Ok(())
        });

        assert!(result.is_ok());
        assert!(!undone);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_cell() {
        assert_eq!(cell(true, true), '█');
        assert_eq!(cell(true, false), '▀');
        assert_eq!(cell(false, true), '▄');
        assert_eq!(cell(false, false), ' ');
    }
}

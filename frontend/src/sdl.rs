use anyhow::{anyhow, Result};
use chip_8_interp_core::{Chip8Color, Display, DisplayError, DisplaySize, FrameBuffer};
use sdl2::{
    event::Event,
    keyboard::Keycode,
    pixels::{Color, PixelFormatEnum},
    render::WindowCanvas,
    EventPump, Sdl,
};

use crate::Frontend;

fn keypad(keycode: Keycode) -> Option<u8> {
    let key = match keycode {
        Keycode::Num1 => 0x1,
        Keycode::Num2 => 0x2,
        Keycode::Num3 => 0x3,
        Keycode::Num4 => 0xC,
        Keycode::Q => 0x4,
        Keycode::W => 0x5,
        Keycode::E => 0x6,
        Keycode::R => 0xD,
        Keycode::A => 0x7,
        Keycode::S => 0x8,
        Keycode::D => 0x9,
        Keycode::F => 0xE,
        Keycode::Z => 0xA,
        Keycode::X => 0x0,
        Keycode::C => 0xB,
        Keycode::V => 0xF,
        _ => return None,
    };
    Some(key)
}

pub struct SdlDisplay {
    fb: FrameBuffer,
    canvas: WindowCanvas,
    events: EventPump,
    held: [bool; 16],
    quit: bool,
    _context: Sdl,
}

impl SdlDisplay {
    pub fn new(
        size: DisplaySize,
        scale: u32,
        foreground: Chip8Color,
        background: Chip8Color,
    ) -> Result<SdlDisplay> {
        let sdl_context = sdl2::init().map_err(|e| anyhow!(e))?;
        let video_subsystem = sdl_context.video().map_err(|e| anyhow!(e))?;

        let window = video_subsystem
            .window(
                "chip-8-interp",
                size.width as u32 * scale,
                size.height as u32 * scale,
            )
            .position_centered()
            .build()?;

        let mut canvas = window.into_canvas().build()?;

        canvas.set_draw_color(Color::RGB(background.r, background.g, background.b));
        canvas.clear();
        canvas.present();

        let events = sdl_context.event_pump().map_err(|e| anyhow!(e))?;

        Ok(SdlDisplay {
            fb: FrameBuffer::with_colors(size, foreground, background),
            canvas,
            events,
            held: [false; 16],
            quit: false,
            _context: sdl_context,
        })
    }

    fn pump_events(&mut self) {
        for event in self.events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => self.quit = true,
                Event::KeyDown {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(key) = keypad(keycode) {
                        self.held[key as usize] = true;
                    }
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(key) = keypad(keycode) {
                        self.held[key as usize] = false;
                    }
                }
                _ => {}
            }
        }
    }
}

impl Display for SdlDisplay {
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

    // Lowest held key wins when several are down
    fn poll_key(&mut self) -> Option<u8> {
        self.pump_events();
        self.held.iter().position(|&down| down).map(|key| key as u8)
    }

    fn size(&self) -> DisplaySize {
        self.fb.size()
    }
}

impl Frontend for SdlDisplay {
    fn quit_requested(&mut self) -> bool {
        self.pump_events();
        self.quit
    }

    fn present(&mut self) -> Result<()> {
        if !self.fb.dirty() {
            return Ok(());
        }

        let width = self.fb.width();
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGBX8888,
            width as u32,
            self.fb.height() as u32,
        )?;

        // Copy CHIP-8 display buffer into GPU texture
        texture.update(None, self.fb.buffer(), width * 4)?;

        // Copy texture to Canvas
        self.canvas.copy(&texture, None, None).map_err(|e| anyhow!(e))?;

        // present canvas on screen
        self.canvas.present();
        self.fb.clear_dirty();
        Ok(())
    }
}

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{ensure, Result};
use chip_8_interp_core::{Chip8, Chip8Builder, Chip8Color, Display};
use clap::Parser;
use log::{error, info, LevelFilter};

mod config;
mod demo;
#[cfg(feature = "sdl")]
mod sdl;
mod terminal;

use config::{Config, IoKind};

const FRAME: Duration = Duration::from_micros(1_000_000 / 60);

/// CHIP-8 Interpreter
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Filepath to Chip-8 ROM file that will be executed [default: built-in demo]
    #[clap(index = 1)]
    rom: Option<PathBuf>,

    /// Filepath to TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Display backend
    #[clap(long, value_enum)]
    io: Option<IoKind>,

    /// Built-in font (chip48, cosmac, dream, eti) or filepath to font file
    #[clap(long)]
    font: Option<String>,

    /// Background Color as HEX 0xAABBFF [default: 0x000000]
    #[clap(long)]
    background: Option<Chip8Color>,

    /// Foreground Color as HEX 0xAABBFF [default: 0xFFFFFF]
    #[clap(long)]
    foreground: Option<Chip8Color>,

    /// Display scaling factor
    #[clap(short, long)]
    scale: Option<u32>,

    /// Instructions per second
    #[clap(short, long)]
    ips: Option<u32>,

    /// PRNG seed
    #[clap(long)]
    seed: Option<u64>,

    /// Shift VY into VX and jump relative to V0, like the COSMAC VIP
    #[clap(long)]
    cosmac: bool,

    /// Wrap sprites at the bottom edge instead of clipping them
    #[clap(long)]
    wrap: bool,

    /// Use the 128x64 display
    #[clap(long)]
    extended: bool,

    /// Call stack depth
    #[clap(long)]
    stack_size: Option<usize>,

    /// Print debug information
    #[clap(short, long)]
    debug: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(rom) = &self.rom {
            config.program = Some(rom.clone());
        }
        if let Some(io) = self.io {
            config.io = io;
        }
        if let Some(font) = &self.font {
            config.font = font.clone();
        }
        if let Some(background) = self.background {
            config.background = background;
        }
        if let Some(foreground) = self.foreground {
            config.foreground = foreground;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(ips) = self.ips {
            config.instructions_per_second = ips;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(stack_size) = self.stack_size {
            config.stack_size = stack_size;
        }
        config.cosmac_compatible |= self.cosmac;
        config.vertical_wrapping |= self.wrap;
        if self.extended {
            config.extended_display = Some(true);
        }
    }
}

/// What the run loop needs from a display besides the [`Display`] calls
/// the interpreter makes.
pub trait Frontend {
    /// Whether the user asked to stop.
    fn quit_requested(&mut self) -> bool;

    /// Draw the pixel grid if it changed since the last call.
    fn present(&mut self) -> Result<()>;

    fn set_tone(&mut self, _on: bool) -> Result<()> {
        Ok(())
    }
}

fn run<D: Display + Frontend>(chip: &mut Chip8<D>, ips: u32) -> Result<()> {
    let delta_update = Duration::from_secs(1) / ips;
    let mut next_update = Instant::now();
    let mut next_frame = next_update;
    let mut tone = false;

    loop {
        // Wait until next update
        let now = Instant::now();
        if let Some(delay) = next_update.checked_duration_since(now) {
            std::thread::sleep(delay);
        }
        next_update += delta_update;

        if chip.display_mut().quit_requested() {
            info!("termination requested");
            return Ok(());
        }

        // Execute one CHIP-8 instruction
        if let Err(err) = chip.step() {
            error!("halted near 0x{:03x}: {}", chip.pc(), err);
            return Err(err.into());
        }

        if chip.sound_active() != tone {
            tone = !tone;
            chip.display_mut().set_tone(tone)?;
        }

        // Redraw at most once per frame
        let now = Instant::now();
        if now >= next_frame {
            next_frame = now + FRAME;
            chip.display_mut().present()?;
        }
    }
}

fn start<D: Display + Frontend>(builder: Chip8Builder, ips: u32, display: D) -> Result<()> {
    let mut chip = builder.build(display)?;
    let result = run(&mut chip, ips);
    chip.terminate();
    result
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Trace
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = config::load(args.config.as_deref())?;
    args.apply(&mut config);

    ensure!(
        (1..=100).contains(&config.scale),
        "Display scaling factor must be between [1-100]"
    );
    ensure!(
        (1..=1_000_000).contains(&config.instructions_per_second),
        "Instructions per second [1-1000000]"
    );

    // Catch unreadable files before the display takes over the terminal
    let builder = config.builder()?;
    let ips = config.instructions_per_second;

    let size = config.display_size();
    info!("{:?} display, {}x{}", config.io, size.width, size.height);

    match config.io {
        IoKind::Terminal => {
            let display =
                terminal::TerminalDisplay::new(size, config.foreground, config.background)?;
            start(builder, ips, display)
        }
        #[cfg(feature = "sdl")]
        IoKind::Sdl => {
            let display =
                sdl::SdlDisplay::new(size, config.scale, config.foreground, config.background)?;
            start(builder, ips, display)
        }
        #[cfg(not(feature = "sdl"))]
        IoKind::Sdl => anyhow::bail!("sdl display requested but this build lacks the `sdl` feature"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chip_8_interp_core::{DisplayError, DisplaySize, FrameBuffer};

    /// In-memory display that asks to quit after a fixed number of checks.
    struct Countdown {
        fb: FrameBuffer,
        checks: usize,
    }

    impl Display for Countdown {
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
            self.fb.poll_key()
        }
    }

    impl Frontend for Countdown {
        fn quit_requested(&mut self) -> bool {
            if self.checks == 0 {
                return true;
            }
            self.checks -= 1;
            false
        }

        fn present(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_start_runs_configured_builder() {
        // Arrange: the built-in demo, stopped after a few instructions
        let builder = Config::default().builder().unwrap();
        let display = Countdown {
            fb: FrameBuffer::new(DisplaySize::STANDARD),
            checks: 8,
        };

        // Act
        let result = start(builder, 1_000_000, display);

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_start_reports_halt() {
        // 0xFFFF is not an instruction
        let builder = Chip8Builder::new().with_rom(vec![0xFF, 0xFF]);
        let display = Countdown {
            fb: FrameBuffer::new(DisplaySize::STANDARD),
            checks: 8,
        };

        assert!(start(builder, 1_000_000, display).is_err());
    }

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "chip-8-interp",
            "game.ch8",
            "--ips",
            "1000",
            "--foreground",
            "0x00FF00",
            "--cosmac",
            "--stack-size",
            "32",
        ]);
        let mut config = Config::default();

        args.apply(&mut config);

        assert_eq!(config.program, Some(PathBuf::from("game.ch8")));
        assert_eq!(config.instructions_per_second, 1000);
        assert_eq!(config.foreground, Chip8Color::new(0, 0xFF, 0));
        assert!(config.cosmac_compatible);
        assert!(!config.vertical_wrapping);
        assert_eq!(config.stack_size, 32);
        assert_eq!(config.scale, 10);
    }

    #[test]
    fn test_args_keep_config() {
        let args = Args::parse_from(["chip-8-interp"]);
        let mut config = config::parse("vertical_wrapping = true\nseed = 5").unwrap();
        let expected = config.clone();

        args.apply(&mut config);

        assert_eq!(config, expected);
    }

    #[test]
    fn test_io_flag() {
        let args = Args::parse_from(["chip-8-interp", "--io", "sdl"]);
        assert_eq!(args.io, Some(IoKind::Sdl));
    }
}

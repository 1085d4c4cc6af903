use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chip_8_interp_core::{
    parse_font_text, BuiltinFont, Chip8Builder, Chip8Color, Compatibility, DisplaySize,
    DEFAULT_BACKGROUND_COLOR, DEFAULT_FOREGROUND_COLOR, DEFAULT_STACK_SIZE,
};
use log::{debug, info, warn};
use serde::{de, Deserialize, Deserializer};

use crate::demo;

pub const CONFIG_ENV: &str = "CHIP_8_CONF_PATH";
pub const LOCAL_CONFIG: &str = "chip8.toml";
/// Directory under the user configuration directory holding [`LOCAL_CONFIG`].
pub const CONFIG_DIR: &str = "chip-8-interp";

static DEFAULT_CONFIG: &str = include_str!("../chip8.toml");

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IoKind {
    #[default]
    Terminal,
    Sdl,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub io: IoKind,
    pub font: String,
    #[serde(deserialize_with = "color")]
    pub foreground: Chip8Color,
    #[serde(deserialize_with = "color")]
    pub background: Chip8Color,
    pub instructions_per_second: u32,
    pub cosmac_compatible: bool,
    pub vertical_wrapping: bool,
    pub extended_display: Option<bool>,
    pub program: Option<PathBuf>,
    pub scale: u32,
    pub seed: Option<u64>,
    pub stack_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            io: IoKind::Terminal,
            font: "chip48".to_string(),
            foreground: DEFAULT_FOREGROUND_COLOR,
            background: DEFAULT_BACKGROUND_COLOR,
            instructions_per_second: 700,
            cosmac_compatible: false,
            vertical_wrapping: false,
            extended_display: None,
            program: None,
            scale: 10,
            seed: None,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

fn color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Chip8Color, D::Error> {
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(de::Error::custom)
}

/// Returns `<base>/chip-8-interp/chip8.toml`, writing the default
/// configuration there first if the file does not exist yet.
fn user_config(base: &Path) -> Result<PathBuf> {
    let dir = base.join(CONFIG_DIR);
    let path = dir.join(LOCAL_CONFIG);
    if !path.is_file() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        fs::write(&path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        info!("wrote default configuration to {}", path.display());
    }
    Ok(path)
}

/// Picks the configuration file: an explicit path wins, then the
/// `CHIP_8_CONF_PATH` variable, then `chip8.toml` in the working directory,
/// then `chip8.toml` in the user configuration directory.
pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env::var_os(CONFIG_ENV).map(PathBuf::from) {
        if path.is_file() {
            return Some(path);
        }
        debug!("{} points to missing file {}", CONFIG_ENV, path.display());
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.is_file() {
        return Some(local);
    }

    let base = dirs::config_dir()?;
    match user_config(&base) {
        Ok(path) => Some(path),
        Err(err) => {
            warn!("{:#}", err);
            None
        }
    }
}

pub fn load(explicit: Option<&Path>) -> Result<Config> {
    match locate(explicit) {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
        }
        None => {
            info!("using built-in configuration");
            parse(DEFAULT_CONFIG)
        }
    }
}

pub fn parse(text: &str) -> Result<Config> {
    Ok(toml::from_str(text)?)
}

impl Config {
    /// COSMAC mode implies the original 64x32 display unless set explicitly.
    pub fn display_size(&self) -> DisplaySize {
        match self.extended_display.unwrap_or(!self.cosmac_compatible) {
            true => DisplaySize::EXTENDED,
            false => DisplaySize::STANDARD,
        }
    }

    pub fn compatibility(&self) -> Compatibility {
        Compatibility::from_flags(self.cosmac_compatible, self.vertical_wrapping)
    }

    pub fn font_bytes(&self) -> Result<Vec<u8>> {
        if let Ok(builtin) = self.font.parse::<BuiltinFont>() {
            return Ok(builtin.bytes().to_vec());
        }

        let path = Path::new(&self.font);
        if path.extension().is_some_and(|ext| ext == "txt") {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read font file {}", path.display()))?;
            let font = parse_font_text(&text)
                .with_context(|| format!("Invalid font file {}", path.display()))?;
            Ok(font)
        } else {
            fs::read(path).with_context(|| format!("Failed to read font file {}", path.display()))
        }
    }

    pub fn program_bytes(&self) -> Result<Vec<u8>> {
        match &self.program {
            Some(path) => fs::read(path)
                .with_context(|| format!("Failed to read ROM file {}", path.display())),
            None => Ok(demo::PROGRAM.to_vec()),
        }
    }

    /// Machine settings from this configuration, ready to be attached to a display.
    pub fn builder(&self) -> Result<Chip8Builder> {
        let mut builder = Chip8Builder::new()
            .with_rom(self.program_bytes()?)
            .with_font(self.font_bytes()?)
            .with_compatibility(self.compatibility())
            .with_stack_size(self.stack_size);

        if let Some(seed) = self.seed {
            builder = builder.with_rng_seed(seed);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chip_8_interp_core::{Chip8Mode, FrameBuffer, VerticalEdge};

    #[test]
    fn test_embedded_default_matches_default() {
        assert_eq!(parse(DEFAULT_CONFIG).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse("cosmac_compatible = true\nforeground = \"#33FF66\"\n").unwrap();

        assert!(config.cosmac_compatible);
        assert_eq!(config.foreground, Chip8Color::new(0x33, 0xFF, 0x66));
        assert_eq!(config.background, DEFAULT_BACKGROUND_COLOR);
        assert_eq!(config.instructions_per_second, 700);
        assert_eq!(config.io, IoKind::Terminal);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse("foreground = \"0xZZZZZZ\"").is_err());
        assert!(parse("io = \"curses\"").is_err());
        assert!(parse("instructions_per_secnd = 10").is_err());
    }

    #[test]
    fn test_display_size() {
        let mut config = Config::default();
        assert_eq!(config.display_size(), DisplaySize::EXTENDED);

        config.cosmac_compatible = true;
        assert_eq!(config.display_size(), DisplaySize::STANDARD);

        config.extended_display = Some(true);
        assert_eq!(config.display_size(), DisplaySize::EXTENDED);
    }

    #[test]
    fn test_compatibility() {
        let config = parse("cosmac_compatible = true\nvertical_wrapping = true").unwrap();
        assert_eq!(
            config.compatibility(),
            Compatibility::new(Chip8Mode::COSMAC_VIP, VerticalEdge::Wrap)
        );
    }

    #[test]
    fn test_builtin_font() {
        let config = parse("font = \"dream\"").unwrap();
        assert_eq!(config.font_bytes().unwrap(), BuiltinFont::Dream6800.bytes());
    }

    #[test]
    fn test_font_text_file() {
        let path = env::temp_dir().join(format!("chip8-font-{}.txt", std::process::id()));
        fs::write(&path, "0x0:\n0b11110000\n0b10010000\n").unwrap();
        let config = Config {
            font: path.display().to_string(),
            ..Config::default()
        };

        let font = config.font_bytes();
        fs::remove_file(&path).unwrap();

        assert_eq!(font.unwrap(), vec![0xF0, 0x90]);
    }

    #[test]
    fn test_missing_program() {
        let config = Config {
            program: Some(PathBuf::from("/nonexistent/program.ch8")),
            ..Config::default()
        };
        assert!(config.program_bytes().is_err());
    }

    #[test]
    fn test_locate_explicit() {
        let path = PathBuf::from("/some/where/chip8.toml");
        assert_eq!(locate(Some(&path)), Some(path));
    }

    #[test]
    fn test_user_config_is_seeded() {
        // Arrange
        let base = env::temp_dir().join(format!("chip8-conf-{}", std::process::id()));

        // Act
        let path = user_config(&base);
        let text = path.as_ref().ok().map(fs::read_to_string);
        fs::remove_dir_all(&base).unwrap();

        // Assert
        let path = path.unwrap();
        assert_eq!(path, base.join(CONFIG_DIR).join(LOCAL_CONFIG));
        let text = text.unwrap().unwrap();
        assert_eq!(text, DEFAULT_CONFIG);
        assert_eq!(parse(&text).unwrap(), Config::default());
    }

    #[test]
    fn test_user_config_is_kept() {
        // Arrange: an edited file already in place
        let base = env::temp_dir().join(format!("chip8-conf-kept-{}", std::process::id()));
        let dir = base.join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(LOCAL_CONFIG), "seed = 3\n").unwrap();

        // Act
        let path = user_config(&base);
        let text = fs::read_to_string(dir.join(LOCAL_CONFIG));
        fs::remove_dir_all(&base).unwrap();

        // Assert
        assert_eq!(path.unwrap(), dir.join(LOCAL_CONFIG));
        assert_eq!(text.unwrap(), "seed = 3\n");
    }

    #[test]
    fn test_builder_runs_demo() {
        let config = parse("seed = 7").unwrap();
        let mut chip = config
            .builder()
            .unwrap()
            .build(FrameBuffer::new(config.display_size()))
            .unwrap();

        assert_eq!(&chip.memory()[0x200..0x202], &demo::PROGRAM[..2]);
        chip.step().unwrap();
    }
}

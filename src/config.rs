use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use ratatui::style::{Color, Modifier};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::palette::ThemeColors;

/// Shortest shader interval accepted from a config file.
pub const MIN_SHADER_INTERVAL_MS: u64 = 10;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hero title
    pub title: String,
    /// Line under the title
    pub tagline: String,

    /// Color configuration
    pub colors: ColorConfig,

    /// Keybindings configuration
    pub keys: KeyConfig,

    /// ASCII shader timing and frame shape
    pub shader: ShaderConfig,

    /// Footer link
    pub link: LinkConfig,

    /// Help text at the bottom
    pub help_text: HelpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub foreground: String,
    pub background: String,
    pub card_bg: String,
    pub card_face: String,
    pub card_label: String,
    pub card_border: String,
    pub focus_border: String,
    pub focus_modifier: Vec<String>, // "bold", "italic", "underlined"
    pub tagline: String,
    pub link_fg: String,
    pub link_bg: String,
    pub help_fg: String,
    pub help_key_fg: String,
    pub help_key_modifier: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub next: Vec<String>,
    pub previous: Vec<String>,
    pub activate: Vec<String>,
    pub open_link: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Milliseconds between frame regenerations while the shader runs
    pub interval_ms: u64,
    pub lines: usize,
    pub width: usize,
    /// Characters the noise is sampled from
    pub glyphs: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub label: String,
    pub url: String,
    /// Program that receives the url as its only argument; empty disables opening
    pub open_command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpConfig {
    pub enabled: bool,
    pub separator: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            title: "weird.cloud".to_string(),
            tagline: "weird shit made by AI".to_string(),
            colors: ColorConfig::default(),
            keys: KeyConfig::default(),
            shader: ShaderConfig::default(),
            link: LinkConfig::default(),
            help_text: HelpConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            foreground: "#ededed".to_string(),
            background: "#0a0a0a".to_string(),
            card_bg: "#6a8f3b".to_string(),
            card_face: "#0d0d0d".to_string(),
            card_label: "#d6a4ff".to_string(),
            card_border: "#6b21a8".to_string(),
            focus_border: "#c49ff0".to_string(),
            focus_modifier: vec!["bold".to_string()],
            tagline: "#c49ff0".to_string(),
            link_fg: "black".to_string(),
            link_bg: "#16a34a".to_string(),
            help_fg: "gray".to_string(),
            help_key_fg: "cyan".to_string(),
            help_key_modifier: vec!["bold".to_string()],
        }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        KeyConfig {
            next: vec!["Right".to_string(), "l".to_string(), "Tab".to_string()],
            previous: vec!["Left".to_string(), "h".to_string()],
            activate: vec!["Enter".to_string(), "Space".to_string()],
            open_link: vec!["o".to_string()],
            quit: vec!["Esc".to_string(), "q".to_string()],
        }
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        ShaderConfig {
            interval_ms: 100,
            lines: 10,
            width: 32,
            glyphs: "#@$%&*+=?.".to_string(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            label: "Fork on GitHub".to_string(),
            url: "https://github.com/cresencio/weird-splash".to_string(),
            open_command: "xdg-open".to_string(),
        }
    }
}

impl Default for HelpConfig {
    fn default() -> Self {
        HelpConfig {
            enabled: true,
            separator: " | ".to_string(),
        }
    }
}

impl Config {
    /// Rejects values the panel cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.shader.lines == 0 || self.shader.width == 0 {
            bail!(
                "shader frame must be at least 1x1, got {}x{}",
                self.shader.lines,
                self.shader.width
            );
        }
        if self.shader.glyphs.is_empty() {
            bail!("shader glyph set is empty");
        }
        if self.shader.interval_ms < MIN_SHADER_INTERVAL_MS {
            bail!(
                "shader interval {}ms is below the {}ms minimum",
                self.shader.interval_ms,
                MIN_SHADER_INTERVAL_MS
            );
        }
        Ok(())
    }

    pub fn shader_interval(&self) -> Duration {
        Duration::from_millis(self.shader.interval_ms)
    }

    pub fn glyphs(&self) -> Vec<char> {
        self.shader.glyphs.chars().collect()
    }

    /// Root colors before the first randomize.
    pub fn initial_theme(&self) -> ThemeColors {
        ThemeColors {
            background: parse_color(&self.colors.background),
            foreground: parse_color(&self.colors.foreground),
            card: parse_color(&self.colors.card_bg),
        }
    }
}

// ============================================================================
// COLOR PARSING
// ============================================================================

pub fn parse_color(color_str: &str) -> Color {
    match color_str.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        // RGB format: #RRGGBB
        hex if hex.starts_with('#') && hex.len() == 7 => {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[1..3], 16),
                u8::from_str_radix(&hex[3..5], 16),
                u8::from_str_radix(&hex[5..7], 16),
            ) {
                Color::Rgb(r, g, b)
            } else {
                Color::White
            }
        }
        _ => Color::White,
    }
}

pub fn parse_modifier(modifiers: &[String]) -> Modifier {
    let mut result = Modifier::empty();
    for modifier in modifiers {
        match modifier.to_lowercase().as_str() {
            "bold" => result |= Modifier::BOLD,
            "italic" => result |= Modifier::ITALIC,
            "underlined" => result |= Modifier::UNDERLINED,
            "slowblink" => result |= Modifier::SLOW_BLINK,
            "rapidblink" => result |= Modifier::RAPID_BLINK,
            "reversed" => result |= Modifier::REVERSED,
            "crossedout" => result |= Modifier::CROSSED_OUT,
            _ => {}
        }
    }
    result
}

// ============================================================================
// CONFIG LOADING
// ============================================================================

pub fn get_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "weird-splash").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads the default config file, falling back to defaults when it is
/// missing or broken.
pub fn load_config() -> Config {
    if let Some(config_path) = get_config_path() {
        if config_path.exists() {
            match load_config_from_path(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(
                        path = %config_path.display(),
                        error = %e,
                        "falling back to default config"
                    );
                    eprintln!("Warning: {:#}", e);
                    eprintln!("Using default configuration.");
                }
            }
        }
    }
    Config::default()
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(config)
}

pub fn generate_config_file() -> Result<PathBuf> {
    let config_path = get_config_path().context("Could not determine config directory")?;
    write_default_config(&config_path)?;
    Ok(config_path)
}

pub fn write_default_config(config_path: &Path) -> Result<()> {
    let config_dir = config_path.parent().context("Invalid config path")?;

    fs::create_dir_all(config_dir).with_context(|| {
        format!(
            "Failed to create config directory: {}",
            config_dir.display()
        )
    })?;

    fs::write(config_path, generate_default_config())
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    Ok(())
}

pub fn generate_default_config() -> String {
    String::from(
        r##"## weird-splash configuration file
## Place this file at ~/.config/weird-splash/config.toml
## All fields are optional - defaults will be used for missing values

title = "weird.cloud"
tagline = "weird shit made by AI"

[colors]
## Available colors:
## Standard: black, red, green, yellow, blue, magenta, cyan, gray, white
## Light variants: lightred, lightgreen, lightyellow, lightblue, lightmagenta, lightcyan
## Dark variants: darkgray
## Hex: "#RRGGBB" (e.g., "#ff0000" for red)
## background, foreground and card_bg are the starting theme; the
## "Brutalist CSS Generator" card replaces them at runtime.
foreground = "#ededed"
background = "#0a0a0a"
card_bg = "#6a8f3b"
card_face = "#0d0d0d"
card_label = "#d6a4ff"
card_border = "#6b21a8"
focus_border = "#c49ff0"
focus_modifier = ["bold"]  ## Options: bold, italic, underlined, slowblink, rapidblink, reversed, crossedout
tagline = "#c49ff0"
link_fg = "black"
link_bg = "#16a34a"
help_fg = "gray"
help_key_fg = "cyan"
help_key_modifier = ["bold"]

[keys]
## Key names: Use crossterm KeyCode names
## Examples: "q", "Esc", "Enter", "Space", "Up", "Down", "Left", "Right", "Tab"
## Modifiers can be added with format: "Ctrl-q", "Alt-q", "Shift-Up"
## Cards can also be triggered with 1-4 or a mouse click.
next = ["Right", "l", "Tab"]
previous = ["Left", "h"]
activate = ["Enter", "Space"]
open_link = ["o"]
quit = ["Esc", "q"]

[shader]
## Milliseconds between ASCII frames while the shader runs (minimum 10)
interval_ms = 100
lines = 10
width = 32
glyphs = "#@$%&*+=?."

[link]
label = "Fork on GitHub"
url = "https://github.com/cresencio/weird-splash"
## Program used to open the url; leave empty to disable
open_command = "xdg-open"

[help_text]
enabled = true
separator = " | "
"##,
    )
}

//! Configuration file support for tv-browser.
//!
//! This module provides functionality for loading and saving user preferences
//! from a TOML configuration file.

use crate::api::DEFAULT_API_URL;
use crate::error::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the catalog API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Directory of static JSON files to browse instead of the API
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Browser command used to open episode pages (overrides platform default)
    #[serde(default)]
    pub browser: Option<String>,

    /// Additional arguments to pass to the browser
    #[serde(default)]
    pub browser_args: Vec<String>,

    /// File to write logs to instead of stderr
    #[serde(default)]
    pub log_file: Option<String>,

    /// Key bindings
    #[serde(default)]
    pub keybindings: Keybindings,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            api_url: default_api_url(),
            data_dir: None,
            request_timeout_secs: default_request_timeout_secs(),
            browser: None,
            browser_args: Vec::new(),
            log_file: None,
            keybindings: Keybindings::default(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/tv-browser/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("tv-browser");

        Ok(config_dir.join("config.toml"))
    }

    /// Default log file: `tv-browser/tv-browser.log` under the user cache directory.
    pub fn default_log_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("tv-browser").join("tv-browser.log"))
    }

    /// Log file to use: the CLI override, then `log_file`, then the default.
    ///
    /// `None` only when no cache directory exists; logging is then discarded,
    /// never sent to the terminal the TUI draws on.
    pub fn log_path(&self, cli_override: Option<&str>) -> Option<PathBuf> {
        cli_override
            .or(self.log_file.as_deref())
            .map(PathBuf::from)
            .or_else(Self::default_log_path)
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            let config = Self::new();
            config.save()?;
        }

        Ok(path)
    }
}

/// Keys bound to each command.
///
/// Keys are written as a character (`"j"`, `"/"`), a named key (`"enter"`,
/// `"esc"`, `"backspace"`, `"tab"`, `"up"`, `"down"`, `"pageup"`,
/// `"pagedown"`, `"home"`, `"end"`), or either prefixed with `"ctrl+"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub select: Vec<String>,
    pub back: Vec<String>,
    pub search: Vec<String>,
    pub clear_search: Vec<String>,
    pub show_picker: Vec<String>,
    pub episode_jump: Vec<String>,
    pub watch: Vec<String>,
    pub retry: Vec<String>,
    pub help: Vec<String>,
    pub quit: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            up: keys(&["k", "up"]),
            down: keys(&["j", "down"]),
            select: keys(&["enter"]),
            back: keys(&["backspace", "b"]),
            search: keys(&["/"]),
            clear_search: keys(&["c"]),
            show_picker: keys(&["s"]),
            episode_jump: keys(&["g"]),
            watch: keys(&["w"]),
            retry: keys(&["r"]),
            help: keys(&["?"]),
            quit: keys(&["q"]),
        }
    }
}

impl Keybindings {
    /// Whether `key` is one of the keys in `binding`.
    pub fn matches(&self, binding: &[String], key: &KeyEvent) -> bool {
        binding.iter().any(|name| key_matches(name, key))
    }

    /// Human-readable form of the first key of a binding, for hints.
    pub fn label(&self, binding: &[String]) -> String {
        binding.first().cloned().unwrap_or_default()
    }
}

fn key_matches(name: &str, key: &KeyEvent) -> bool {
    let (ctrl, name) = match name.strip_prefix("ctrl+") {
        Some(rest) => (true, rest),
        None => (false, name),
    };
    if ctrl != key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    let code = match name.to_lowercase().as_str() {
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "space" => KeyCode::Char(' '),
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return false,
            }
        }
    };

    code == key.code
}

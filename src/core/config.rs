//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.luacurses/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LuacursesConfig {
    #[serde(default)]
    pub screen: ScreenConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ScreenConfig {
    pub echo: Option<bool>,
    pub alternate_screen: Option<bool>,
    pub hide_cursor: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LogConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
pub const DEFAULT_LOG_FILE: &str = "luacurses.log";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// How a screen behaves once initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenOptions {
    /// Echo typed characters into the window during `read`/`readline`.
    pub echo: bool,
    pub alternate_screen: bool,
    pub hide_cursor: bool,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            echo: true,
            alternate_screen: true,
            hide_cursor: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub screen: ScreenOptions,
    pub log_level: log::LevelFilter,
    pub log_file: PathBuf,
}

/// Values taken from command-line flags (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.luacurses/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".luacurses").join("config.toml"))
}

/// Load config from `~/.luacurses/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `LuacursesConfig::default()`.
pub fn load_config() -> Result<LuacursesConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(LuacursesConfig::default())
        }
    }
}

/// Load config from an explicit path. Same contract as [`load_config`].
pub fn load_config_from(path: &Path) -> Result<LuacursesConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(LuacursesConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: LuacursesConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# luacurses Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [screen]
# echo = true                # Echo typed characters during read/readline
# alternate_screen = true    # Draw on the alternate screen buffer
# hide_cursor = false        # Hide the hardware cursor while a screen is active

# [log]
# level = "info"             # "off", "error", "warn", "info", "debug", "trace"
# file = "luacurses.log"     # Or set LUACURSES_LOG_FILE env var
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve only the screen section. Used when loaded as a Lua module, where
/// the host owns logging.
pub fn resolve_screen(config: &ScreenConfig) -> ScreenOptions {
    let defaults = ScreenOptions::default();
    ScreenOptions {
        echo: config.echo.unwrap_or(defaults.echo),
        alternate_screen: config.alternate_screen.unwrap_or(defaults.alternate_screen),
        hide_cursor: config.hide_cursor.unwrap_or(defaults.hide_cursor),
    }
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &LuacursesConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Log level: CLI → env → config → default
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("LUACURSES_LOG_LEVEL").ok())
        .or_else(|| config.log.level.clone())
        .map(|level| parse_level(&level))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    // Log file: CLI → env → config → default
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| std::env::var("LUACURSES_LOG_FILE").ok().map(PathBuf::from))
        .or_else(|| config.log.file.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    ResolvedConfig {
        screen: resolve_screen(&config.screen),
        log_level,
        log_file,
    }
}

fn parse_level(level: &str) -> log::LevelFilter {
    match level.parse() {
        Ok(filter) => filter,
        Err(_) => {
            warn!("Unknown log level {:?}, using {}", level, DEFAULT_LOG_LEVEL);
            DEFAULT_LOG_LEVEL
        }
    }
}

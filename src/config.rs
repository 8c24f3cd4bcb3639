//! Configuration system for labwm
//!
//! Loads configuration from TOML file at `~/.config/labwm/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decorations: DecorationConfig,
    pub colors: WindowColors,
    pub features: FeatureConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Configuration loaded from {:?}", path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("labwm");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string).context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Frame geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationConfig {
    /// Title bar height in pixels
    pub titlebar_height: u16,
    /// Frame border width in pixels
    pub border_width: u16,
    /// Smallest width a managed window is ever given
    pub min_width: u16,
    /// Smallest height a managed window is ever given
    pub min_height: u16,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            titlebar_height: 20,
            border_width: 2,
            min_width: 80,
            min_height: 80,
        }
    }
}

/// Frame colors (hex: 0xRRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowColors {
    /// Frame background, visible behind the title bar
    pub background: u32,
    /// Frame border
    pub border: u32,
}

impl Default for WindowColors {
    fn default() -> Self {
        Self {
            background: 0x2e3440, // Polar Night Darkest
            border: 0x000000,
        }
    }
}

/// Capability flags, resolved against the server once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Apply non-rectangular client shapes to frames (needs the SHAPE extension)
    pub shape: bool,
    /// Honor `_MOTIF_WM_HINTS` decoration requests
    pub mwm_hints: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            shape: true,
            mwm_hints: true,
        }
    }
}

//! Editor configuration
//!
//! Stored as TOML. Every field has a default, so a config file only needs the
//! values it changes:
//!
//! ```toml
//! asset_root = "assets"
//!
//! [world]
//! width = 128
//! height = 96
//!
//! [render]
//! tile_size = 32
//! ```

use farm_map_render::IncrementalRenderer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// World dimensions in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
        }
    }
}

/// Renderer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// On-screen size of one cell in pixels
    pub tile_size: u32,
    /// Changed-cell count at which a frame redraws every layer
    pub full_redraw_threshold: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tile_size: 16,
            full_redraw_threshold: farm_map_render::DEFAULT_FULL_REDRAW_THRESHOLD,
        }
    }
}

impl RenderConfig {
    /// Renderer set up with these settings
    pub fn renderer(&self) -> IncrementalRenderer {
        IncrementalRenderer::new(self.tile_size).with_threshold(self.full_redraw_threshold)
    }
}

/// Settings for an editor session and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Version for future migrations
    pub version: u32,
    /// Directory sprite sheet paths are resolved against
    pub asset_root: PathBuf,
    /// Maximum number of undo entries kept
    pub history_limit: usize,
    pub world: WorldConfig,
    pub render: RenderConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            asset_root: PathBuf::from("assets"),
            history_limit: 100,
            world: WorldConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_toml_string()?)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject sizes the grid and renderer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.width == 0 || self.world.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "world size must be non-zero, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        if self.render.tile_size == 0 {
            return Err(ConfigError::Invalid("tile_size must be non-zero".into()));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be non-zero".into()));
        }
        Ok(())
    }
}

//! Configuration handling for Slotpack
//!
//! Configuration is stored in `.slotpack/config.toml` (project) and
//! `~/.config/slotpack/config.toml` (global). Project values win.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{SlotBounds, SLOT_COLUMNS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Slot geometry and card defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Hours for new cards when none are given
    pub default_hours: u8,

    /// Left edge of the slot in pixels, for `--x` without `--left`
    pub slot_left: f64,

    /// Slot width in pixels, for `--x` without `--width`
    pub slot_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_hours: 1,
            slot_left: 0.0,
            slot_width: 200.0,
        }
    }
}

impl LayoutConfig {
    /// Slot bounds with optional per-call overrides
    pub fn bounds(&self, left: Option<f64>, width: Option<f64>) -> SlotBounds {
        SlotBounds::new(left.unwrap_or(self.slot_left), width.unwrap_or(self.slot_width))
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Overrides the global output format
    pub default_format: Option<OutputFormat>,

    pub layout: LayoutConfig,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

const DEFAULT_PROJECT_CONFIG: &str = r#"# Slotpack configuration

# Output format when --format is not given ("text" or "json")
# default_format = "text"

[layout]
# Hours for cards created without --hours (1-4)
default_hours = 1

# Slot geometry used to turn --x into a column
slot_left = 0.0
slot_width = 200.0
"#;

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project_root = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_project_root_from(&dir));

        let project = match &project_root {
            Some(root) => Self::load_project_config(root)?,
            None => ProjectConfig::default(),
        };

        let config = Self {
            project,
            global,
            project_root,
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "slotpack", "slotpack").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(".slotpack").join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")
    }

    /// Finds the project root by looking for a `.slotpack/` directory
    /// at `start` or any of its parents
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(".slotpack").is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Creates `.slotpack/config.toml` under `root` unless it already exists
    ///
    /// Returns the path of the config file.
    pub fn init_project(root: &Path) -> Result<PathBuf> {
        let dir = root.join(".slotpack");
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create .slotpack directory: {}", dir.display()))?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_PROJECT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Ok(config_path)
    }

    /// Rejects values the layout code cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.project.layout;
        if !(1..=SLOT_COLUMNS).contains(&layout.default_hours) {
            return Err(ConfigError::Invalid(format!(
                "layout.default_hours must be between 1 and {}, got {}",
                SLOT_COLUMNS, layout.default_hours
            )));
        }
        if !(layout.slot_width.is_finite() && layout.slot_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "layout.slot_width must be positive, got {}",
                layout.slot_width
            )));
        }
        Ok(())
    }

    /// Output format from project config, then global config
    pub fn effective_format(&self) -> OutputFormat {
        self.project
            .default_format
            .unwrap_or(self.global.default_format)
    }

    /// Returns true if we're in a slotpack project
    pub fn is_in_project(&self) -> bool {
        self.project_root.is_some()
    }
}

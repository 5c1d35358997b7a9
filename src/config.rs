// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DEFAULT_STATUS_COLOR: &str = "gray";
const DEFAULT_HELP_COLOR: &str = "yellow";

/// Settings loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ConfigFile {
    /// Tracing filter directive, e.g. "info" or "promptbar=debug"
    pub log_level: String,
    /// Where log output goes; defaults to a file in the data directory
    pub log_file: Option<PathBuf>,
    /// Foreground colour of the passive status line
    pub status_color: String,
    /// Foreground colour of the help line message
    pub help_color: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            status_color: DEFAULT_STATUS_COLOR.to_string(),
            help_color: DEFAULT_HELP_COLOR.to_string(),
        }
    }
}

impl ConfigFile {
    pub(crate) fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".to_string()))?;
        Ok(dir.join("promptbar"))
    }

    pub(crate) fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub(crate) fn default_log_file() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("promptbar")
            .join("promptbar.log")
    }

    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields the defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        parse_color(&self.status_color)?;
        parse_color(&self.help_color)?;
        Ok(())
    }

    pub(crate) fn status_color(&self) -> Color {
        parse_color(&self.status_color).unwrap_or(Color::Gray)
    }

    pub(crate) fn help_color(&self) -> Color {
        parse_color(&self.help_color).unwrap_or(Color::Yellow)
    }
}

pub(crate) fn parse_color(value: &str) -> Result<Color> {
    Color::from_str(value).map_err(|_| Error::Config(format!("Invalid color: {value}")))
}

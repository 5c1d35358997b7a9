// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Log setup. The terminal is in raw mode while the UI runs, so all log
//! output goes to a file.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::ConfigFile;
use crate::error::{Error, Result};

const LOG_ENV: &str = "PROMPTBAR_LOG";

/// Pick the filter: environment first, then the command line, then config.
fn filter(level: Option<&str>, config: &ConfigFile) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    let directive = level.unwrap_or(&config.log_level);
    EnvFilter::try_new(directive)
        .map_err(|err| Error::Config(format!("Invalid log level '{directive}': {err}")))
}

fn log_path(config: &ConfigFile) -> PathBuf {
    config
        .log_file
        .clone()
        .unwrap_or_else(ConfigFile::default_log_file)
}

fn open_log(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber. Returns the log file path.
pub(crate) fn init(level: Option<&str>, config: &ConfigFile) -> Result<PathBuf> {
    let filter = filter(level, config)?;
    let path = log_path(config);
    let file = open_log(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|err| Error::Config(format!("Failed to initialise logging: {err}")))?;

    Ok(path)
}

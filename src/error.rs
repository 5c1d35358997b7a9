// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command error: {0}")]
    Command(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Returns a concise message suitable for the status line.
    /// Keeps only the first line so multi-line parser errors fit in one row.
    pub(crate) fn status_message(&self) -> String {
        match self {
            Error::Toml(err) => err.message().to_string(),
            other => other
                .to_string()
                .lines()
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

mod action;
mod app;
mod config;
mod cursor;
mod error;
mod evaluate;
mod logging;
mod prompt;
mod readline;
mod render;
mod state;
mod view;
mod width;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

use crate::config::ConfigFile;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "promptbar")]
#[command(about = "Status line and modal prompt bar demo")]
#[command(version)]
#[command(styles = STYLES, color = clap::ColorChoice::Always)]
struct Args {
    #[arg(short, long, help = "Config file (default: <config dir>/promptbar/config.toml)")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Initial status message")]
    status: Option<String>,

    #[arg(long, help = "Log filter, e.g. debug or promptbar=trace")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match ConfigFile::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match logging::init(args.log_level.as_deref(), &config) {
        Ok(path) => tracing::info!("logging to {}", path.display()),
        Err(e) => eprintln!("Warning: {}", e),
    }

    let app = app::App::new(config);
    if let Some(status) = &args.status {
        app.set_status(status);
    }

    if let Err(e) = app::run(app).await {
        tracing::error!("{e}");
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

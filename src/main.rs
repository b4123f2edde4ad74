#![forbid(unsafe_code)]

mod color;
mod commands;
mod config;
mod constants;
mod crosshair;
mod gui;
mod hotkeys;
mod overlay;
mod positioning;
mod signals;
mod tray;
mod x11_utils;

use clap::Parser;
use std::path::PathBuf;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::FmtSubscriber;

use config::SettingsStore;
use gui::OverlayOptions;

/// Always-on-top click-through crosshair overlay
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory holding settings.json and profiles.json
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Do not listen for F2/F3 and right-click on input devices
    #[arg(long)]
    no_hotkeys: bool,

    /// Do not register a system tray icon
    #[arg(long)]
    no_tray: bool,

    /// Open the settings dialog at startup
    #[arg(long)]
    settings: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_dir = cli.config_dir.unwrap_or_else(config::default_config_dir);
    let store = SettingsStore::in_dir(&config_dir);
    info!(path = %store.path().display(), "Using settings file");

    let options = OverlayOptions {
        hotkeys: !cli.no_hotkeys,
        tray: !cli.no_tray,
        open_settings: cli.settings,
    };

    gui::run_overlay(store, options)?;
    Ok(())
}

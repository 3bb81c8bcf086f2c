//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::state::SettingsStore;

const MIN_TICK_MS: u64 = 10;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "boil-alarm")]
#[command(about = "A boil timer daemon that fires staged hop-addition alerts")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Settings file (defaults to the platform config directory)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// How often the timer is ticked, in milliseconds
    #[arg(long, default_value = "250")]
    pub tick_ms: u64,

    /// Directory holding beep.oga, bell.oga, airhorn.oga and chirp.oga;
    /// without it alerts ring the terminal bell
    #[arg(long)]
    pub sounds_dir: Option<PathBuf>,

    /// Program used to play sound files
    #[arg(long, default_value = "paplay")]
    pub player: String,

    /// Never send desktop notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Inhibit sleep while a boil is running
    #[arg(long)]
    pub keep_awake: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.settings.clone().unwrap_or_else(SettingsStore::default_path)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(MIN_TICK_MS))
    }
}

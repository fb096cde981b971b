use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "weekcal.log";

/// Send logs to `weekcal.log` beside the config file, keeping the terminal
/// free for the UI. `RUST_LOG` overrides the default `info` level.
pub fn init(config_path: &Path) -> Result<PathBuf> {
    let path = config_path.with_file_name(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(path)
}

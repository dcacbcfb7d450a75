//! Tracing setup. Events go to a log file under the XDG state dir; when that
//! file cannot be opened the subscriber writes to stderr instead.

use anyhow::{anyhow, Result};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,kourdump=debug,kourdump_core=debug";

/// Where log output ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

impl fmt::Display for LogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogTarget::File(p) => write!(f, "{}", p.display()),
            LogTarget::Stderr => f.write_str("stderr"),
        }
    }
}

/// `RUST_LOG` if set and valid, else [`DEFAULT_FILTER`].
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/kourdump/kourdump.log`, creating the directory.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("kourdump")?;
    Ok(xdg_dirs.place_state_file("kourdump.log")?)
}

/// Install the global subscriber writing to [`log_file_path`] (appending).
/// Errors if the file cannot be opened or a subscriber is already set.
pub fn init_logging() -> Result<LogTarget> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("install subscriber: {}", e))?;

    tracing::info!("kourdump logging initialized at {}", path.display());
    Ok(LogTarget::File(path))
}

/// Install the global subscriber on stderr. A subscriber that is already set is kept.
pub fn init_logging_stderr() -> LogTarget {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
    LogTarget::Stderr
}

/// File logging, falling back to stderr. Never fails.
pub fn init() -> LogTarget {
    match init_logging() {
        Ok(target) => target,
        Err(e) => {
            let target = init_logging_stderr();
            tracing::warn!("log file unavailable ({:#}); logging to stderr", e);
            target
        }
    }
}

//! Log output setup
//!
//! Events are filtered through `POSTBOARD_LOG` (EnvFilter syntax, default
//! `warn`). One-shot commands log to stderr. The browser owns the terminal, so
//! it logs to a file instead.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "POSTBOARD_LOG";

/// File name used by the browser inside the log directory
pub const LOG_FILE_NAME: &str = "postboard.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs a subscriber writing to stderr
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Installs a subscriber appending to `<dir>/postboard.log`
///
/// # Returns
/// The path of the log file
pub fn init_file(dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE_NAME);
    let file: File = OpenOptions::new().create(true).append(true).open(&path)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();

    Ok(path)
}

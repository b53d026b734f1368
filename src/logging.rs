use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable naming the log file
pub(crate) const LOG_FILE_VAR: &str = "SHEETCAL_LOG_FILE";

/// Where logs go when neither `--log-file` nor `$SHEETCAL_LOG_FILE` is given
pub(crate) fn default_log_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("sheetcal").join("sheetcal.log"))
}

/// Sends log records to `path`, filtered by `RUST_LOG` (default: `info`).
///
/// The terminal belongs to the calendar while it runs, so logs never go to
/// stderr.  If the file cannot be opened, logging stays off.
pub(crate) fn init(path: &Path) {
    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| OpenOptions::new().create(true).append(true).open(path));
    let Ok(file) = file else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .try_init();
    if installed.is_ok() {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting sheetcal");
    }
}

//! Logging setup for lfs-ext

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::constants::LOG_DIR;

/// Log directory used when none is given
pub fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join(LOG_DIR)
}

/// `lfs-ext-<pid>-<millis>.log`; filters for several files of one checkout
/// run concurrently, so the pid keeps their logs apart.
fn log_file_name(pid: u32, started: SystemTime) -> String {
    let millis = started
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("lfs-ext-{pid}-{millis}.log")
}

/// Create a fresh log file in `dir`, creating the directory if needed
pub fn open_log_file(dir: &Path) -> io::Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(log_file_name(std::process::id(), SystemTime::now()));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Install the console and file subscribers.
///
/// Console output goes to stderr since stdout may carry pipeline output.
/// The file layer records debug events into `log_dir` (or the default log
/// dir) and is skipped when the file cannot be created.
pub fn init(verbose: bool, log_dir: Option<&Path>) {
    let default_level = if verbose { "debug" } else { "info" };
    let dir = log_dir.map_or_else(default_log_dir, Path::to_path_buf);
    let opened = open_log_file(&dir);

    let file_layer = opened.as_ref().ok().and_then(|(_, file)| {
        let file = file.try_clone().ok()?;
        Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_level(true)
                .with_filter(EnvFilter::new("debug")),
        )
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true)
                .with_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new(default_level)),
                ),
        )
        .with(file_layer)
        .init();

    match opened {
        Ok((path, _)) => debug!("Logging to {:?}", path),
        // Only worth a warning when the directory was asked for.
        Err(e) if log_dir.is_some() => warn!("No log file in {:?}: {}", dir, e),
        Err(e) => debug!("No log file in {:?}: {}", dir, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_log_file_name() {
        let started = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(log_file_name(42, started), "lfs-ext-42-1700000000123.log");
    }

    #[test]
    fn test_open_log_file_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("logs");

        let (path, _) = open_log_file(&nested).unwrap();

        assert!(path.starts_with(&nested));
        assert!(path.is_file());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(&format!("lfs-ext-{}-", std::process::id())));
    }

    #[test]
    fn test_open_log_file_fails_on_file_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(open_log_file(file.path()).is_err());
    }
}

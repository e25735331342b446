use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `TAJA_LOG=debug`
pub const LOG_ENV: &str = "TAJA_LOG";

/// Where the log file lives. The terminal is owned by the UI, so logs never go to stdout.
pub fn log_path() -> PathBuf {
    ProjectDirs::from("", "", "taja")
        .map(|pd| pd.data_local_dir().join("taja.log"))
        .unwrap_or_else(|| PathBuf::from("taja.log"))
}

/// Installs the global subscriber writing to `path`. Fails if one is already installed.
pub fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_path_is_a_file_name() {
        assert_eq!(
            log_path().file_name().and_then(|n| n.to_str()),
            Some("taja.log")
        );
    }

    #[test]
    fn init_creates_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("taja.log");

        // another test may have installed the global subscriber first
        let _ = init_logging(&path);

        assert!(path.exists());
    }
}

//! Log output setup
//!
//! The terminal belongs to the TUI, so logs go to a file as JSON lines. Logging is
//! off unless a file is given on the command line or `TRANSITBOARD_LOG` is set, in
//! which case the platform cache directory is used.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable that enables logging to the default path
pub const LOG_ENV_VAR: &str = "TRANSITBOARD_LOG";

const DEFAULT_DIRECTIVE: &str = "transitboard=info";

/// Default log file location (`~/.cache/transitboard/transitboard.log` on Linux)
pub fn default_log_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "transitboard")?;
    Some(project_dirs.cache_dir().join("transitboard.log"))
}

/// Picks the log destination: an explicit path wins, then the env var default
pub fn resolve_log_path(explicit: Option<&Path>, env_enabled: bool) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None if env_enabled => default_log_path(),
        None => None,
    }
}

/// Opens the log file for appending, creating parent directories
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber if a log destination is configured
///
/// Returns the path being written to, if any. `RUST_LOG` directives are honoured
/// on top of the `transitboard=info` default.
pub fn init_logging(explicit: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let env_enabled = std::env::var_os(LOG_ENV_VAR).is_some();
    let Some(path) = resolve_log_path(explicit, env_enabled) else {
        return Ok(None);
    };

    let file = open_log_file(&path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .init();

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let explicit = PathBuf::from("/tmp/explicit.log");
        assert_eq!(
            resolve_log_path(Some(&explicit), true),
            Some(explicit.clone())
        );
        assert_eq!(resolve_log_path(Some(&explicit), false), Some(explicit));
    }

    #[test]
    fn test_resolve_without_destination_disables_logging() {
        assert!(resolve_log_path(None, false).is_none());
    }

    #[test]
    fn test_default_log_path_is_project_scoped() {
        if let Some(path) = default_log_path() {
            let path_str = path.to_string_lossy();
            assert!(path_str.contains("transitboard"));
            assert!(path_str.ends_with("transitboard.log"));
        }
        // Passes when there is no home directory (e.g. in CI)
    }

    #[test]
    fn test_open_log_file_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("logs").join("app.log");

        open_log_file(&path).expect("Should open log file");

        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_appends() {
        use std::io::Write;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("app.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}

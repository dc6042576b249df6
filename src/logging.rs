//! Log routing for the service and CLI binaries.
//!
//! The server writes compact lines to stdout and mirrors them to a log file: `DOCQA_LOG_FILE` when
//! set (appended), otherwise `logs/docqa.log` under the working directory. The CLI logs to stderr
//! only so its stdout stays parseable JSON. `RUST_LOG` overrides the default level of either.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable naming an explicit log file.
pub const LOG_FILE_ENV: &str = "DOCQA_LOG_FILE";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_NAME: &str = "docqa.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where the server's file layer writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Append to a caller-chosen file.
    File(PathBuf),
    /// `docqa.log` inside a directory created on demand.
    Directory(PathBuf),
}

impl LogDestination {
    /// Resolve the destination from the value of [`LOG_FILE_ENV`], if any.
    pub fn resolve(explicit: Option<String>) -> Self {
        match explicit.filter(|path| !path.trim().is_empty()) {
            Some(path) => Self::File(PathBuf::from(path)),
            None => Self::Directory(PathBuf::from(DEFAULT_LOG_DIR)),
        }
    }

    /// Full path of the log file.
    pub fn path(&self) -> PathBuf {
        match self {
            Self::File(path) => path.clone(),
            Self::Directory(dir) => dir.join(DEFAULT_LOG_NAME),
        }
    }

    fn writer(&self) -> Option<NonBlocking> {
        let (writer, guard) = match self {
            Self::File(path) => tracing_appender::non_blocking(open_append(path)?),
            Self::Directory(dir) => {
                if let Err(err) = std::fs::create_dir_all(dir) {
                    eprintln!("Failed to create log directory {}: {err}", dir.display());
                    return None;
                }
                tracing_appender::non_blocking(tracing_appender::rolling::never(
                    dir,
                    DEFAULT_LOG_NAME,
                ))
            }
        };
        let _ = LOG_GUARD.set(guard);
        Some(writer)
    }
}

/// Install the server subscriber: stdout plus the file named by [`LogDestination::resolve`].
///
/// Defaults to `info`. File logging is skipped, with a note on stderr, when the file cannot be
/// opened.
pub fn init_tracing() {
    let destination = LogDestination::resolve(std::env::var(LOG_FILE_ENV).ok());
    let registry = tracing_subscriber::registry()
        .with(filter("info"))
        .with(fmt::layer().with_target(false).compact());

    match destination.writer() {
        Some(writer) => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_ansi(false)
                    .compact(),
            )
            .init(),
        None => registry.init(),
    }
}

/// Install the CLI subscriber: stderr only, defaulting to `warn`.
pub fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(filter("warn"))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn open_append(path: &Path) -> Option<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| eprintln!("Failed to open log file {}: {err}", path.display()))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_file_wins() {
        let destination = LogDestination::resolve(Some("/var/log/docqa/server.log".into()));
        assert_eq!(
            destination,
            LogDestination::File(PathBuf::from("/var/log/docqa/server.log"))
        );
        assert_eq!(destination.path(), PathBuf::from("/var/log/docqa/server.log"));
    }

    #[test]
    fn unset_or_blank_uses_default_directory() {
        for explicit in [None, Some(String::new()), Some("  ".into())] {
            let destination = LogDestination::resolve(explicit);
            assert_eq!(destination.path(), Path::new("logs").join("docqa.log"));
        }
    }

    #[test]
    fn unopenable_file_disables_file_layer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let destination = LogDestination::File(dir.path().join("missing/parent/docqa.log"));
        assert!(destination.writer().is_none());
    }
}

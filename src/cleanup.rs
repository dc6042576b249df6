//! Periodic removal of stale uploads.
//!
//! Upload handling lives outside this service, but files land in a directory this process can
//! see. When `UPLOAD_DIR` is configured, a background task deletes files older than
//! `UPLOAD_MAX_AGE_SECS` once at startup and then every `UPLOAD_SWEEP_INTERVAL_SECS`.

use crate::config::Config;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;

/// Sweep settings derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPolicy {
    /// Directory to sweep.
    pub dir: PathBuf,
    /// Files whose modification time is older than this are removed.
    pub max_age: Duration,
    /// Delay between sweeps.
    pub interval: Duration,
}

impl CleanupPolicy {
    /// Build a policy from configuration; `None` when no upload directory is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        config.upload_dir.as_ref().map(|dir| Self {
            dir: dir.clone(),
            max_age: Duration::from_secs(config.upload_max_age_secs),
            interval: Duration::from_secs(config.upload_sweep_interval_secs),
        })
    }
}

/// Spawn the periodic sweep. The first sweep runs immediately.
pub fn spawn_cleanup(policy: CleanupPolicy) -> JoinHandle<()> {
    tracing::info!(
        dir = %policy.dir.display(),
        max_age_secs = policy.max_age.as_secs(),
        interval_secs = policy.interval.as_secs(),
        "Starting upload cleanup"
    );
    tokio::spawn(async move {
        // `interval` panics on a zero period.
        let mut ticker = tokio::time::interval(policy.interval.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            match sweep_stale_files(&policy.dir, policy.max_age, SystemTime::now()).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Removed stale uploads"),
                Err(error) => tracing::warn!(
                    dir = %policy.dir.display(),
                    error = %error,
                    "Upload cleanup failed to read directory"
                ),
            }
        }
    })
}

/// Delete regular files in `dir` last modified more than `max_age` before `now`.
///
/// Only a failure to list the directory is returned; per-file errors are logged and skipped.
/// Returns the number of files removed.
pub async fn sweep_stale_files(dir: &Path, max_age: Duration, now: SystemTime) -> io::Result<usize> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "Cleanup stat failed");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        let age = now.duration_since(modified).unwrap_or_default();
        if age <= max_age {
            continue;
        }
        match tokio::fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "Cleanup unlink failed")
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_only_files_older_than_max_age() {
        let dir = tempfile::tempdir().expect("tempdir");
        let old = dir.path().join("old.pdf");
        let fresh = dir.path().join("fresh.pdf");
        std::fs::write(&old, b"old").expect("write");
        std::fs::write(&fresh, b"fresh").expect("write");
        std::fs::create_dir(dir.path().join("nested")).expect("mkdir");

        // Pretend two hours have passed, then refresh one file.
        let now = SystemTime::now() + Duration::from_secs(2 * 60 * 60);
        let fresh_file = std::fs::File::options()
            .write(true)
            .open(&fresh)
            .expect("open");
        fresh_file
            .set_modified(now - Duration::from_secs(60))
            .expect("touch");

        let removed = sweep_stale_files(dir.path(), Duration::from_secs(60 * 60), now)
            .await
            .expect("sweep");

        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(dir.path().join("nested").exists());
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let result = sweep_stale_files(
            Path::new("/definitely/not/a/dir"),
            Duration::from_secs(1),
            SystemTime::now(),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn policy_requires_upload_dir() {
        let mut config = Config::with_inference_url("http://127.0.0.1:9000");
        assert!(CleanupPolicy::from_config(&config).is_none());

        config.upload_dir = Some(PathBuf::from("/srv/uploads"));
        let policy = CleanupPolicy::from_config(&config).expect("policy");
        assert_eq!(policy.max_age, Duration::from_secs(3600));
        assert_eq!(policy.interval, Duration::from_secs(600));
    }
}

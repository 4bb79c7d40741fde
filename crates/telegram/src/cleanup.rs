//! Periodic removal of stale staging files

use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;

use crate::context::AppContext;

/// Spawn the background task sweeping the download directory
///
/// Also prunes idle rate limiter entries on every run.
pub fn spawn_cleanup(ctx: AppContext) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ctx.config.cleanup_interval);
        loop {
            interval.tick().await;

            match sweep(&ctx.config.download_dir, ctx.config.file_max_age).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Removed {} stale file(s)", removed),
                Err(e) => tracing::warn!(
                    "Cleanup of {} failed: {}",
                    ctx.config.download_dir.display(),
                    e
                ),
            }

            ctx.limiter.cleanup();
        }
    })
}

/// Delete regular files in `dir` last modified more than `max_age` ago
///
/// A missing directory counts as empty.
pub async fn sweep(dir: &Path, max_age: Duration) -> io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age <= max_age {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Failed to remove {}: {}", entry.path().display(), e),
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn write_aged(dir: &Path, name: &str, age: Duration) {
        let file = File::create(dir.join(name)).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[tokio::test]
    async fn test_sweep_removes_only_old_files() {
        let dir = tempfile::tempdir().unwrap();
        write_aged(dir.path(), "old.part", Duration::from_secs(3600));
        write_aged(dir.path(), "fresh.part", Duration::from_secs(10));
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let removed = sweep(dir.path(), Duration::from_secs(1200)).await.unwrap();

        assert_eq!(removed, 1);
        assert!(!dir.path().join("old.part").exists());
        assert!(dir.path().join("fresh.part").exists());
        assert!(dir.path().join("nested").exists());
    }

    #[tokio::test]
    async fn test_sweep_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert_eq!(sweep(&missing, Duration::ZERO).await.unwrap(), 0);
    }
}

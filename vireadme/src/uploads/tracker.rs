use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use nanoid::nanoid;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Tracking entry for one temp file.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    /// Distinguishes this upload from any later file written to the same path.
    pub id: String,
    pub created_at: DateTime<Utc>,
    fallback: CancellationToken,
}

struct TrackerInner {
    dir: PathBuf,
    cleanup_delay: Duration,
    entries: Mutex<HashMap<PathBuf, UploadRecord>>,
}

/// Owns the lifecycle of every temp file written by the service.
///
/// Each tracked file is released either immediately through
/// [`TempUpload::release`] or by a delayed fallback task scheduled by
/// [`UploadTracker::track`]. Both paths are idempotent; the map lock is held
/// only around insert/remove, never across disk I/O.
#[derive(Clone)]
pub struct UploadTracker {
    inner: Arc<TrackerInner>,
}

impl UploadTracker {
    pub fn new(dir: impl Into<PathBuf>, cleanup_delay: Duration) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                dir: dir.into(),
                cleanup_delay,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn cleanup_delay(&self) -> Duration {
        self.inner.cleanup_delay
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.inner.dir).await?;
        Ok(())
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, UploadRecord>> {
        // The map holds no invariants a panicking holder could break.
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start tracking `path` and schedule its fallback deletion.
    ///
    /// Must be called from within a tokio runtime.
    pub fn track(&self, path: PathBuf) -> TempUpload {
        let record = UploadRecord {
            id: nanoid!(),
            created_at: Utc::now(),
            fallback: CancellationToken::new(),
        };
        let id = record.id.clone();
        let token = record.fallback.clone();

        if let Some(previous) = self.entries().insert(path.clone(), record) {
            warn!(path = %path.display(), previous = %previous.id, "Path was already tracked, replacing entry");
        }
        debug!(path = %path.display(), id = %id, "Tracking upload");

        let tracker = self.clone();
        let delay = self.inner.cleanup_delay;
        let fallback_path = path.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(path = %fallback_path.display(), "Fallback deletion cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    tracker.release_generation(&fallback_path, Some(&id)).await;
                }
            }
        });

        TempUpload {
            path,
            tracker: self.clone(),
            released: false,
        }
    }

    /// Delete `path` from disk and drop its tracking entry.
    ///
    /// Returns `true` when a file was actually removed. Releasing an
    /// already-deleted path is a no-op; deletion failures are logged and never
    /// propagated.
    pub async fn release(&self, path: &Path) -> bool {
        self.release_generation(path, None).await
    }

    /// Release that only touches `path` while it still belongs to upload `id`
    /// (or to nobody). With `id == None` the current entry is always released.
    async fn release_generation(&self, path: &Path, id: Option<&str>) -> bool {
        if let Some(id) = id {
            let owned_by_other = self
                .entries()
                .get(path)
                .is_some_and(|record| record.id != id);
            if owned_by_other {
                debug!(path = %path.display(), "Path reused by a newer upload, skipping fallback");
                return false;
            }
        }

        let removed = match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!(path = %path.display(), fallback = id.is_some(), "Deleted temp file");
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = %path.display(), "Error deleting temp file: {}", e);
                false
            }
        };

        self.forget(path, id);
        removed
    }

    /// Synchronous variant used from `Drop`.
    fn release_blocking(&self, path: &Path) -> bool {
        let removed = match std::fs::remove_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "Deleted temp file on drop");
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = %path.display(), "Error deleting temp file: {}", e);
                false
            }
        };

        self.forget(path, None);
        removed
    }

    fn forget(&self, path: &Path, id: Option<&str>) {
        let mut entries = self.entries();
        let matches = match (entries.get(path), id) {
            (Some(record), Some(id)) => record.id == id,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if matches {
            entries.remove(path);
        }
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.entries().contains_key(path)
    }

    pub fn tracked_count(&self) -> usize {
        self.entries().len()
    }

    pub fn record(&self, path: &Path) -> Option<UploadRecord> {
        self.entries().get(path).cloned()
    }

    /// Cancel every pending fallback timer and delete all still-tracked files.
    ///
    /// Returns the number of files removed.
    pub async fn shutdown(&self) -> usize {
        let pending: Vec<PathBuf> = {
            let entries = self.entries();
            for record in entries.values() {
                record.fallback.cancel();
            }
            entries.keys().cloned().collect()
        };

        let mut removed = 0;
        for path in pending {
            if self.release(&path).await {
                removed += 1;
            }
        }

        if removed > 0 {
            info!(removed, "Removed leftover temp files on shutdown");
        }
        removed
    }
}

/// Scoped handle for one temp file.
///
/// Call [`TempUpload::release`] once processing finishes, whatever its
/// outcome. A handle dropped without release deletes its file synchronously.
pub struct TempUpload {
    path: PathBuf,
    tracker: UploadTracker,
    released: bool,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn release(mut self) -> bool {
        self.released = true;
        self.tracker.release(&self.path).await
    }
}

impl std::fmt::Debug for TempUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempUpload")
            .field("path", &self.path)
            .field("released", &self.released)
            .finish()
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if !self.released {
            debug!(path = %self.path.display(), "TempUpload dropped without release");
            self.tracker.release_blocking(&self.path);
        }
    }
}

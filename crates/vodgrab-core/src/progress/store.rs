use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::aggregate::AggregateProgress;
use super::listener::ProgressListener;
use super::persist::{load_statuses, save_statuses};
use super::status::DownloadStatus;

/// File name of the status map inside a broadcast's storage root.
pub const STATUS_FILE_NAME: &str = "status.json";

/// Default denominator for published progress.
pub const DEFAULT_RESOLUTION: u64 = 1000;

struct Shared {
    path: PathBuf,
    statuses: RwLock<HashMap<String, DownloadStatus>>,
    aggregate: AggregateProgress,
    listener: RwLock<Option<Arc<dyn ProgressListener>>>,
    /// Keeps progress notifications in publication order.
    notify: Mutex<()>,
}

/// Status map for one broadcast, persisted to `status.json`.
///
/// Cloning is cheap and shares state. Status writes and the file rewrite
/// happen under one write lock; `status` and `count` take the read side.
#[derive(Clone)]
pub struct ProgressStore {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("path", &self.shared.path)
            .field("progress", &self.shared.aggregate.current())
            .finish()
    }
}

impl ProgressStore {
    /// Opens the store for `storage_root/status.json`.
    pub fn open_in(storage_root: &Path) -> Self {
        Self::open(storage_root.join(STATUS_FILE_NAME), DEFAULT_RESOLUTION)
    }

    /// Loads `path`, dropping every entry that is not `Downloaded`.
    ///
    /// An unreadable file is logged and treated as empty: every segment is
    /// then downloaded again, which is always safe.
    pub fn open(path: impl Into<PathBuf>, resolution: u64) -> Self {
        let path = path.into();
        let statuses = match load_statuses(&path) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring status file: {:#}", e);
                HashMap::new()
            }
        };
        tracing::debug!(path = %path.display(), downloaded = statuses.len(), "opened progress store");
        Self {
            shared: Arc::new(Shared {
                path,
                statuses: RwLock::new(statuses),
                aggregate: AggregateProgress::new(resolution),
                listener: RwLock::new(None),
                notify: Mutex::new(()),
            }),
        }
    }

    pub fn set_listener(&self, listener: Arc<dyn ProgressListener>) {
        *self
            .shared
            .listener
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(listener);
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    pub fn resolution(&self) -> u64 {
        self.shared.aggregate.resolution()
    }

    /// Published progress in `0..=resolution`.
    pub fn progress(&self) -> u64 {
        self.shared.aggregate.current()
    }

    pub fn status(&self, id: &str) -> DownloadStatus {
        self.read_statuses().get(id).copied().unwrap_or_default()
    }

    /// Number of segments in `status`. `Untracked` counts the expected parts
    /// that are neither downloaded nor failed.
    pub fn count(&self, status: DownloadStatus) -> usize {
        let map = self.read_statuses();
        match status {
            DownloadStatus::Untracked => {
                let tracked = map.values().filter(|s| **s != DownloadStatus::Untracked).count();
                (self.shared.aggregate.total_parts() as usize).saturating_sub(tracked)
            }
            _ => map.values().filter(|s| **s == status).count(),
        }
    }

    /// Starts a run over `expected_total_parts` segments. Entries that are not
    /// `Downloaded` are discarded and progress restarts at `R * D / N`.
    pub fn reset(&self, expected_total_parts: usize) {
        let downloaded = {
            let mut map = self.write_statuses();
            let before = map.len();
            map.retain(|_, s| *s == DownloadStatus::Downloaded);
            if map.len() != before {
                self.persist(&map);
            }
            map.len()
        };
        self.shared
            .aggregate
            .reset(downloaded as u64, expected_total_parts as u64);
        tracing::debug!(
            path = %self.shared.path.display(),
            downloaded,
            total = expected_total_parts,
            "progress reset"
        );
        if let Some(listener) = self.listener() {
            listener.progress_changed(self.progress(), self.resolution());
            listener.count_changed(DownloadStatus::Downloaded, downloaded);
            listener.count_changed(DownloadStatus::Failed, 0);
        }
    }

    /// Drops the record for `id`, e.g. when its file has disappeared.
    pub fn forget(&self, id: &str) {
        let mut map = self.write_statuses();
        if map.remove(id).is_some() {
            self.persist(&map);
        }
    }

    /// Progress handle for one segment transfer.
    pub fn track(&self, id: impl Into<String>) -> PartProgress {
        PartProgress {
            id: id.into(),
            store: self.clone(),
            expected: 0,
            so_far: 0,
            registered: false,
            done: false,
        }
    }

    fn set_status(&self, id: &str, status: DownloadStatus) -> usize {
        let count = {
            let mut map = self.write_statuses();
            map.insert(id.to_string(), status);
            self.persist(&map);
            map.values().filter(|s| **s == status).count()
        };
        if let Some(listener) = self.listener() {
            listener.count_changed(status, count);
        }
        count
    }

    /// Persistence failures are logged; the in-memory map stays authoritative.
    fn persist(&self, map: &HashMap<String, DownloadStatus>) {
        if let Err(e) = save_statuses(&self.shared.path, map) {
            tracing::warn!(path = %self.shared.path.display(), "could not save status file: {:#}", e);
        }
    }

    fn publish(&self) {
        let _order = self.shared.notify.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(value) = self.shared.aggregate.publish() {
            if let Some(listener) = self.listener() {
                listener.progress_changed(value, self.resolution());
            }
        }
    }

    fn listener(&self) -> Option<Arc<dyn ProgressListener>> {
        self.shared
            .listener
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn read_statuses(&self) -> RwLockReadGuard<'_, HashMap<String, DownloadStatus>> {
        self.shared.statuses.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_statuses(&self) -> RwLockWriteGuard<'_, HashMap<String, DownloadStatus>> {
        self.shared.statuses.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Per-segment progress handle returned by [`ProgressStore::track`].
///
/// Owned by the single task transferring the segment. After `finish` or
/// `invalidate` further calls are ignored.
#[derive(Debug)]
pub struct PartProgress {
    id: String,
    store: ProgressStore,
    expected: i64,
    so_far: i64,
    registered: bool,
    done: bool,
}

impl PartProgress {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bytes_so_far(&self) -> u64 {
        self.so_far as u64
    }

    /// Reports `bytes_so_far` of `expected_total` bytes (unknown totals track
    /// the bytes seen so far).
    pub fn update(&mut self, bytes_so_far: u64, expected_total: Option<u64>) {
        if self.done {
            return;
        }
        let agg = &self.store.shared.aggregate;
        let so_far = i64::try_from(bytes_so_far).unwrap_or(i64::MAX);
        let expected = expected_total
            .map(|t| i64::try_from(t).unwrap_or(i64::MAX))
            .unwrap_or(so_far);

        if !self.registered || expected != self.expected {
            agg.add_expected(expected - self.expected, !self.registered);
            self.registered = true;
            self.expected = expected;
        }

        let capped = so_far.min(expected);
        if capped != self.so_far {
            agg.add_transferred(capped - self.so_far);
            self.so_far = capped;
        }
        self.store.publish();
    }

    /// Marks the segment `Downloaded` and counts it as fully transferred.
    pub fn finish(&mut self) {
        if std::mem::replace(&mut self.done, true) {
            return;
        }
        self.store.set_status(&self.id, DownloadStatus::Downloaded);
        let agg = &self.store.shared.aggregate;
        // Empty bodies never reach `update`.
        if !self.registered {
            agg.add_expected(0, true);
            self.registered = true;
        }
        agg.add_transferred(self.expected - self.so_far);
        self.so_far = self.expected;
        self.store.publish();
    }

    /// Marks the segment `Failed` and withdraws its transferred bytes.
    pub fn invalidate(&mut self) {
        if std::mem::replace(&mut self.done, true) {
            return;
        }
        self.store.set_status(&self.id, DownloadStatus::Failed);
        self.store.shared.aggregate.add_transferred(-self.so_far);
        self.so_far = 0;
        self.store.publish();
    }
}

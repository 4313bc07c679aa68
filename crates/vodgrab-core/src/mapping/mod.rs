//! Segment-to-file mapping inside a broadcast's storage root.
//!
//! Segment `n` (1-based, in normalized order) is stored as `part{n}.{ext}`
//! where `ext` comes from the segment URL's path.

mod manifest;

pub use manifest::{manifest_line, MANIFEST_FILE_NAME};

use std::path::{Path, PathBuf};

use crate::playlist::Segment;
use crate::progress::{DownloadStatus, ProgressStore};
use crate::url_model::extension_from_url_path;

/// One segment and the local file it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartEntry {
    pub segment: Segment,
    /// Path relative to the storage root.
    pub file_name: String,
    /// Absolute (root-joined) path.
    pub path: PathBuf,
}

impl PartEntry {
    pub fn id(&self) -> &str {
        self.segment.id()
    }
}

/// Ordered part files for one broadcast.
#[derive(Debug, Clone)]
pub struct PartMapping {
    root: PathBuf,
    entries: Vec<PartEntry>,
}

impl PartMapping {
    pub fn new(root: impl Into<PathBuf>, segments: &[Segment]) -> Self {
        let root = root.into();
        let entries = segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                let file_name = part_file_name(i + 1, segment);
                PartEntry {
                    path: root.join(&file_name),
                    segment: segment.clone(),
                    file_name,
                }
            })
            .collect();
        Self { root, entries }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[PartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded as downloaded and present on disk.
    pub fn is_complete(&self, entry: &PartEntry, store: &ProgressStore) -> bool {
        store.status(entry.id()) == DownloadStatus::Downloaded && entry.path.is_file()
    }

    /// Entries that still need a transfer.
    pub fn pending(&self, store: &ProgressStore) -> Vec<PartEntry> {
        self.entries
            .iter()
            .filter(|e| !self.is_complete(e, store))
            .cloned()
            .collect()
    }

    /// Drops `Downloaded` records whose file no longer exists. Returns how many.
    pub fn forget_missing(&self, store: &ProgressStore) -> usize {
        let mut forgotten = 0;
        for entry in &self.entries {
            if store.status(entry.id()) == DownloadStatus::Downloaded && !entry.path.is_file() {
                tracing::info!(part = %entry.file_name, "part recorded as downloaded but missing; fetching again");
                store.forget(entry.id());
                forgotten += 1;
            }
        }
        forgotten
    }
}

fn part_file_name(n: usize, segment: &Segment) -> String {
    match extension_from_url_path(&segment.location) {
        Some(ext) => format!("part{n}.{ext}"),
        None => format!("part{n}"),
    }
}

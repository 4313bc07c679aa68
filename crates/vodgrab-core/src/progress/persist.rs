//! `status.json` on disk: a flat JSON object from segment URI to status.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::status::DownloadStatus;

/// Reads the status file as written, failures included. A missing file is an
/// empty map. Nothing is modified.
pub fn read_status_file(path: &Path) -> Result<HashMap<String, DownloadStatus>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(e).with_context(|| format!("read status file: {}", path.display())),
    };
    serde_json::from_slice(&bytes).with_context(|| format!("parse status file: {}", path.display()))
}

/// Reads the status file, keeping only `Downloaded` entries.
pub(super) fn load_statuses(path: &Path) -> Result<HashMap<String, DownloadStatus>> {
    Ok(read_status_file(path)?
        .into_iter()
        .filter(|(_, status)| *status == DownloadStatus::Downloaded)
        .collect())
}

/// Rewrites the whole status file. Writes a sibling temp file and renames it
/// over the old one so readers never see a partial file.
pub(super) fn save_statuses(path: &Path, statuses: &HashMap<String, DownloadStatus>) -> Result<()> {
    let sorted: BTreeMap<&str, DownloadStatus> = statuses
        .iter()
        .filter(|(_, status)| **status != DownloadStatus::Untracked)
        .map(|(id, status)| (id.as_str(), *status))
        .collect();
    let json = serde_json::to_string_pretty(&sorted).context("serialize status map")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let tmp = temp_path(path);
    std::fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

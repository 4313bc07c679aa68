//! `vodgrab status` – part counts of one storage directory.

use anyhow::{bail, Result};
use std::path::Path;
use vodgrab_core::progress::{read_status_file, DownloadStatus, STATUS_FILE_NAME};

pub fn run_status(dir: &Path) -> Result<()> {
    let path = dir.join(STATUS_FILE_NAME);
    if !path.is_file() {
        bail!("no {} in {}", STATUS_FILE_NAME, dir.display());
    }
    let (downloaded, failed) = status_counts(&path)?;
    println!("{:<12} {}", "STATUS", "PARTS");
    println!("{:<12} {}", "downloaded", downloaded);
    println!("{:<12} {}", "failed", failed);
    Ok(())
}

/// Downloaded and failed entries of a status file, read without touching it.
pub(crate) fn status_counts(path: &Path) -> Result<(usize, usize)> {
    let map = read_status_file(path)?;
    let count = |status| map.values().filter(|s| **s == status).count();
    Ok((count(DownloadStatus::Downloaded), count(DownloadStatus::Failed)))
}

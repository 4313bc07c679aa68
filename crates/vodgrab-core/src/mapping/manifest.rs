//! Concatenation manifest (`ffmpeg-concat.txt`).
//!
//! The file is input for ffmpeg's concat demuxer, not the `concat:` protocol:
//! `ffmpeg -f concat -safe 0 -i ffmpeg-concat.txt -c copy out.mp4`, adding
//! `-bsf:a aac_adtstoasc` when MPEG-TS parts with AAC audio go into MP4. Names
//! are relative to the manifest. Missing parts are demuxer comments.

use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{PartEntry, PartMapping};
use crate::progress::ProgressStore;

pub const MANIFEST_FILE_NAME: &str = "ffmpeg-concat.txt";

/// `file '<name>'` for a complete part, `# Missing file '<name>'` otherwise.
pub fn manifest_line(entry: &PartEntry, complete: bool) -> String {
    let quoted = entry.file_name.replace('\'', r"'\''");
    if complete {
        format!("file '{quoted}'")
    } else {
        format!("# Missing file '{quoted}'")
    }
}

impl PartMapping {
    /// One line per part, in segment order.
    pub fn manifest_lines(&self, store: &ProgressStore) -> Vec<String> {
        self.entries()
            .iter()
            .map(|e| manifest_line(e, self.is_complete(e, store)))
            .collect()
    }

    /// Writes the manifest into the storage root and returns its path.
    pub fn write_manifest(&self, store: &ProgressStore) -> Result<PathBuf> {
        let path = self.root().join(MANIFEST_FILE_NAME);
        let mut text = self.manifest_lines(store).join("\n");
        text.push('\n');
        std::fs::write(&path, text).with_context(|| format!("write manifest: {}", path.display()))?;
        Ok(path)
    }
}

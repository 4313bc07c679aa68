//! Broadcast descriptors and their resolution into download-ready segments.

mod descriptor;
mod error;
mod resolve;

pub use descriptor::{BroadcastDescriptor, FlatPart, SourceDescriptor};
pub use error::SourceError;
pub use resolve::{
    muted_count_from_ranges, resolve_source, segment_parser, ResolvedSource, DEFAULT_RENDITION_GROUP,
    TOTAL_SECS_TAG,
};

use serde::{Deserialize, Serialize};

/// How a broadcast's video is stored upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Flat list of whole video files.
    Flat,
    /// Segmented HLS playlist.
    Playlist,
}

impl SourceKind {
    /// Storage scheme implied by a broadcast id: `a`/`b` ids are flat
    /// archives, `v` ids are playlists.
    pub fn from_broadcast_id(id: &str) -> Result<Self, SourceError> {
        match id.chars().next() {
            Some('a') | Some('b') => Ok(SourceKind::Flat),
            Some('v') => Ok(SourceKind::Playlist),
            _ => Err(SourceError::UnrecognizedFormat { id: id.to_string() }),
        }
    }
}

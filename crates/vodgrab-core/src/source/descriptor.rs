//! Broadcast descriptors as handed over by the catalog side.

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::SourceError;
use super::SourceKind;
use crate::url_model::storage_dir_name;

/// One archived broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastDescriptor {
    pub id: String,
    pub title: String,
    /// Recording timestamp as given by the catalog (opaque).
    #[serde(default)]
    pub recorded_at: Option<String>,
    #[serde(default)]
    pub duration_secs: u64,
    #[serde(default)]
    pub views: u64,
    /// Only selected broadcasts are downloaded.
    #[serde(default = "selected_by_default")]
    pub selected: bool,
    pub source: SourceDescriptor,
}

fn selected_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDescriptor {
    Flat {
        parts: Vec<FlatPart>,
    },
    Playlist {
        /// Source list (variant playlist) URI.
        uri: Url,
        /// Rendition to download; the configured default when absent.
        #[serde(default)]
        rendition_group: Option<String>,
        /// Muted segment count from broadcast metadata, if known.
        #[serde(default)]
        muted_count: Option<usize>,
        /// Lengths of the muted time ranges from broadcast metadata. Used to
        /// derive the muted count when `muted_count` is absent.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        muted_ranges_secs: Vec<u64>,
    },
}

impl SourceDescriptor {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceDescriptor::Flat { .. } => SourceKind::Flat,
            SourceDescriptor::Playlist { .. } => SourceKind::Playlist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatPart {
    pub url: Url,
    pub length_secs: u64,
    #[serde(default)]
    pub muted: bool,
}

impl BroadcastDescriptor {
    /// Checks the id's storage scheme against the source shape.
    pub fn source_kind(&self) -> Result<SourceKind, SourceError> {
        let kind = SourceKind::from_broadcast_id(&self.id)?;
        if kind != self.source.kind() {
            return Err(SourceError::UnrecognizedFormat {
                id: self.id.clone(),
            });
        }
        Ok(kind)
    }

    /// `{id}-{sanitized title}`.
    pub fn storage_dir_name(&self) -> String {
        storage_dir_name(&self.id, &self.title)
    }
}

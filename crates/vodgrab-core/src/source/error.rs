use thiserror::Error;

use crate::playlist::PlaylistError;

/// Failure to turn a broadcast descriptor into segments. Never retried.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unrecognized source format for broadcast {id:?}")]
    UnrecognizedFormat { id: String },
    #[error("rendition group {group:?} not listed in {uri}")]
    RenditionNotFound { group: String, uri: String },
    #[error(transparent)]
    Playlist(#[from] PlaylistError),
}

//! Playlist parse and fetch errors.

use thiserror::Error;

/// Error from parsing or fetching a playlist.
///
/// `Malformed` is the only variant produced by the parser for bad input; it is
/// never retried.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("malformed playlist: {0}")]
    Malformed(String),
    #[error("tag handler already registered for #{0}")]
    DuplicateHandler(String),
    #[error("playlist read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("playlist fetch failed: {0}")]
    Curl(#[from] curl::Error),
}

impl PlaylistError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        PlaylistError::Malformed(reason.into())
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, PlaylistError::Malformed(_))
    }
}

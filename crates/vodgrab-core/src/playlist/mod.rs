//! Extended-M3U playlist parsing.
//!
//! A playlist is read line by line. Tag lines (`#NAME[:values]`) are handed to a
//! [`TagRegistry`] which folds them into a [`Properties`] accumulator; content
//! lines are resolved against the playlist URI and turned into entries by the
//! entry type's [`PlaylistEntry::emit`] step. Two entry types exist: [`Segment`]
//! for media playlists and [`RenditionRef`] for source lists.

mod attributes;
mod error;
mod fetch;
mod parse;
mod property;
mod tags;

pub use attributes::{split_unquoted, unquote};
pub use error::PlaylistError;
pub use fetch::{fetch_playlist, FetchOptions};
pub use parse::{PlaylistEntry, PlaylistParser};
pub use property::{Properties, PropertyKey, PropertyValue, TagNamespace};
pub use tags::{parse_duration_ms, TagHandler, TagRegistry};

use url::Url;

/// Literal marker every playlist must start with.
pub const HEADER: &str = "#EXTM3U";

/// One downloadable unit of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub location: Url,
    /// Expected play time in milliseconds, or -1 when the playlist did not declare it.
    pub expected_duration_ms: i64,
    pub muted: bool,
}

impl Segment {
    pub fn new(location: Url, expected_duration_ms: i64) -> Self {
        Self {
            location,
            expected_duration_ms,
            muted: false,
        }
    }

    /// Tracking identifier: the resolved URI string.
    pub fn id(&self) -> &str {
        self.location.as_str()
    }
}

/// Reference to an alternate rendition's playlist, as listed in a source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenditionRef {
    pub group_id: String,
    pub bandwidth_bps: i64,
    pub codecs: Vec<String>,
    pub playlist_location: Url,
}

/// Parsed playlist: ordered entries plus playlist-scoped properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistResult<E> {
    pub entries: Vec<E>,
    pub properties: Properties,
}

impl<E> PlaylistResult<E> {
    /// True once the upstream has closed the playlist (`#EXT-X-ENDLIST`).
    pub fn is_ended(&self) -> bool {
        self.properties.ended()
    }
}

impl PlaylistResult<RenditionRef> {
    /// First rendition whose group id equals `group_id`.
    pub fn rendition(&self, group_id: &str) -> Option<&RenditionRef> {
        self.entries.iter().find(|r| r.group_id == group_id)
    }
}

#[cfg(test)]
mod tests;

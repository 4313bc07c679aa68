//! Line loop shared by both parse modes.

use std::io::{BufRead, BufReader, Read};

use url::Url;

use super::attributes::split_unquoted;
use super::error::PlaylistError;
use super::fetch::{fetch_playlist, FetchOptions};
use super::property::{Properties, PropertyKey, PropertyValue, TagNamespace};
use super::tags::{TagHandler, TagRegistry};
use super::{PlaylistResult, RenditionRef, Segment, HEADER};

/// Entry type produced for each content line.
pub trait PlaylistEntry: Sized {
    /// Builds the entry for `location` from the tag state.
    ///
    /// Returns the state with every per-entry key this entry consumed removed;
    /// playlist-scoped keys must be handed back untouched.
    fn emit(location: Url, state: Properties) -> Result<(Self, Properties), PlaylistError>;
}

impl PlaylistEntry for Segment {
    fn emit(location: Url, mut state: Properties) -> Result<(Self, Properties), PlaylistError> {
        let duration = match state.remove(&PropertyKey::PendingDuration) {
            Some(PropertyValue::Int(ms)) => ms,
            _ => -1,
        };
        Ok((Segment::new(location, duration), state))
    }
}

impl PlaylistEntry for RenditionRef {
    fn emit(location: Url, mut state: Properties) -> Result<(Self, Properties), PlaylistError> {
        state.remove(&PropertyKey::PendingDuration);
        let group_id = state
            .text(&PropertyKey::raw(TagNamespace::Media, "GROUP-ID"))
            .or_else(|| state.text(&PropertyKey::raw(TagNamespace::StreamInf, "VIDEO")))
            .unwrap_or_default()
            .to_string();
        let bandwidth_bps = state.int(&PropertyKey::StreamBandwidth).unwrap_or(0);
        let codecs = match state.get(&PropertyKey::StreamCodecs) {
            Some(PropertyValue::TextList(list)) => list.clone(),
            _ => Vec::new(),
        };
        state.purge_namespace(TagNamespace::Media);
        state.purge_namespace(TagNamespace::StreamInf);
        let entry = RenditionRef {
            group_id,
            bandwidth_bps,
            codecs,
            playlist_location: location,
        };
        Ok((entry, state))
    }
}

/// Playlist parser with its own copy of the tag handler set.
#[derive(Debug, Clone, Default)]
pub struct PlaylistParser {
    tags: TagRegistry,
}

impl PlaylistParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler to this parser only. Fails if `name` is already handled.
    pub fn add_handler(&mut self, name: &str, handler: TagHandler) -> Result<(), PlaylistError> {
        self.tags.add_handler(name, handler)
    }

    pub fn parse_str<E: PlaylistEntry>(
        &self,
        base: &Url,
        text: &str,
    ) -> Result<PlaylistResult<E>, PlaylistError> {
        self.parse(base, text.as_bytes())
    }

    /// Parses a playlist read from `input`, resolving content lines against `base`.
    pub fn parse<E: PlaylistEntry, R: Read>(
        &self,
        base: &Url,
        input: R,
    ) -> Result<PlaylistResult<E>, PlaylistError> {
        let mut lines = BufReader::new(input).lines();

        let mut header = None;
        for line in lines.by_ref() {
            let line = read_line(line)?;
            let line = line.trim();
            if !line.is_empty() {
                header = Some(line.to_string());
                break;
            }
        }
        match header.as_deref() {
            None => return Err(PlaylistError::malformed("empty playlist")),
            Some(HEADER) => {}
            Some(_) => return Err(PlaylistError::malformed(format!("missing {HEADER} header"))),
        }

        let mut entries = Vec::new();
        let mut state = Properties::new();
        for line in lines {
            let line = read_line(line)?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            state = self.step(base, line, state, &mut entries)?;
        }

        // A trailing tag with no content line after it is not playlist-scoped.
        state.remove(&PropertyKey::PendingDuration);
        Ok(PlaylistResult {
            entries,
            properties: state,
        })
    }

    /// GETs `url` and parses the body against it.
    pub fn fetch<E: PlaylistEntry>(
        &self,
        url: &Url,
        opts: &FetchOptions,
    ) -> Result<PlaylistResult<E>, PlaylistError> {
        let body = fetch_playlist(url, opts)?;
        tracing::debug!(url = %url, bytes = body.len(), "fetched playlist");
        self.parse(url, body.as_slice())
    }

    fn step<E: PlaylistEntry>(
        &self,
        base: &Url,
        line: &str,
        state: Properties,
        entries: &mut Vec<E>,
    ) -> Result<Properties, PlaylistError> {
        if let Some(tag) = line.strip_prefix('#') {
            let (name, values) = match tag.split_once(':') {
                Some((name, rest)) => (name.trim(), split_unquoted(rest)),
                None => (tag.trim(), Vec::new()),
            };
            return match self.tags.get(name) {
                Some(handler) => handler(base, &values, state),
                None => Ok(state),
            };
        }

        let location = base
            .join(line)
            .map_err(|e| PlaylistError::malformed(format!("content line {line:?}: {e}")))?;
        let (entry, state) = E::emit(location, state)?;
        entries.push(entry);
        Ok(state)
    }
}

/// Playlists are UTF-8 text; anything else is malformed, not an I/O failure.
fn read_line(line: std::io::Result<String>) -> Result<String, PlaylistError> {
    line.map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => PlaylistError::malformed("playlist is not valid UTF-8"),
        _ => PlaylistError::Io(e),
    })
}

//! Descriptor -> ordered segments, via the playlist parser and normalizer.

use std::sync::Arc;

use url::Url;

use super::descriptor::{BroadcastDescriptor, FlatPart, SourceDescriptor};
use super::error::SourceError;
use super::SourceKind;
use crate::normalize::merge_aliased_segments;
use crate::playlist::{
    parse_duration_ms, FetchOptions, PlaylistError, PlaylistParser, PlaylistResult, Properties,
    PropertyKey, PropertyValue, RenditionRef, Segment,
};

/// Rendition picked when a descriptor does not name one (highest quality).
pub const DEFAULT_RENDITION_GROUP: &str = "chunked";

/// Playlist tag carrying the broadcast's total length.
pub const TOTAL_SECS_TAG: &str = "EXT-X-TWITCH-TOTAL-SECS";

const TOTAL_SECS_KEY: &str = "TOTAL-SECS";
const MUTED_SUFFIX: &str = "-muted.ts";

/// Segments of one broadcast, ready for mapping and scheduling.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    pub kind: SourceKind,
    pub segments: Vec<Segment>,
    /// False while an upstream playlist is still open (live broadcast).
    pub ended: bool,
    pub total_duration_ms: i64,
    pub muted_count: usize,
}

impl ResolvedSource {
    pub fn from_flat_parts(parts: &[FlatPart]) -> Self {
        let segments: Vec<Segment> = parts
            .iter()
            .map(|p| Segment {
                location: p.url.clone(),
                expected_duration_ms: (p.length_secs as i64).saturating_mul(1000),
                muted: p.muted,
            })
            .collect();
        let muted_count = segments.iter().filter(|s| s.muted).count();
        Self {
            kind: SourceKind::Flat,
            total_duration_ms: sum_durations(&segments),
            segments,
            ended: true,
            muted_count,
        }
    }

    /// Marks muted segments, merges aliased entries and reads the total length.
    pub fn from_media_playlist(playlist: PlaylistResult<Segment>, muted_count: Option<usize>) -> Self {
        let ended = playlist.is_ended();
        let declared_total = playlist
            .properties
            .int(&PropertyKey::Custom(TOTAL_SECS_KEY.to_string()));
        let segments: Vec<Segment> = playlist
            .entries
            .into_iter()
            .map(|mut s| {
                s.muted = s.location.path().ends_with(MUTED_SUFFIX);
                s
            })
            .collect();
        let segments = merge_aliased_segments(segments);
        let muted_count = muted_count.unwrap_or_else(|| segments.iter().filter(|s| s.muted).count());
        Self {
            kind: SourceKind::Playlist,
            total_duration_ms: declared_total.unwrap_or_else(|| sum_durations(&segments)),
            segments,
            ended,
            muted_count,
        }
    }
}

fn sum_durations(segments: &[Segment]) -> i64 {
    segments
        .iter()
        .map(|s| s.expected_duration_ms.max(0))
        .sum()
}

/// Muted segment count derived from muted time ranges: one per started minute.
pub fn muted_count_from_ranges(durations_secs: &[u64]) -> usize {
    durations_secs
        .iter()
        .map(|d| d.div_ceil(60) as usize)
        .sum()
}

/// Segment-mode parser with the total-length tag registered.
pub fn segment_parser() -> Result<PlaylistParser, PlaylistError> {
    let mut parser = PlaylistParser::new();
    parser.add_handler(
        TOTAL_SECS_TAG,
        Arc::new(|_: &Url, values: &[String], mut state: Properties| {
            let value = values
                .first()
                .ok_or_else(|| PlaylistError::Malformed(format!("#{TOTAL_SECS_TAG} without a value")))?;
            let ms = parse_duration_ms(value)?;
            state.set(
                PropertyKey::Custom(TOTAL_SECS_KEY.to_string()),
                PropertyValue::Int(ms),
            )?;
            Ok::<_, PlaylistError>(state)
        }),
    )?;
    Ok(parser)
}

/// Resolves `descriptor` into segments. Blocking: playlist sources are fetched.
pub fn resolve_source(
    descriptor: &BroadcastDescriptor,
    default_group: &str,
    opts: &FetchOptions,
) -> Result<ResolvedSource, SourceError> {
    descriptor.source_kind()?;
    match &descriptor.source {
        SourceDescriptor::Flat { parts } => Ok(ResolvedSource::from_flat_parts(parts)),
        SourceDescriptor::Playlist {
            uri,
            rendition_group,
            muted_count,
            muted_ranges_secs,
        } => {
            let muted_count = muted_count.or_else(|| {
                (!muted_ranges_secs.is_empty()).then(|| muted_count_from_ranges(muted_ranges_secs))
            });
            let group = rendition_group.as_deref().unwrap_or(default_group);
            let sources: PlaylistResult<RenditionRef> = PlaylistParser::new().fetch(uri, opts)?;
            let rendition = sources
                .rendition(group)
                .ok_or_else(|| SourceError::RenditionNotFound {
                    group: group.to_string(),
                    uri: uri.to_string(),
                })?;
            tracing::debug!(
                id = %descriptor.id,
                group,
                bandwidth = rendition.bandwidth_bps,
                playlist = %rendition.playlist_location,
                "selected rendition"
            );
            let media: PlaylistResult<Segment> =
                segment_parser()?.fetch(&rendition.playlist_location, opts)?;
            Ok(ResolvedSource::from_media_playlist(media, muted_count))
        }
    }
}

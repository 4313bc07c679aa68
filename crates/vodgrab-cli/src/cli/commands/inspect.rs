//! `vodgrab inspect` – print a playlist's renditions or normalized segments.

use anyhow::{anyhow, Context, Result};
use url::Url;
use vodgrab_core::config::VodgrabConfig;
use vodgrab_core::playlist::{
    fetch_playlist, FetchOptions, PlaylistParser, PlaylistResult, RenditionRef, Segment,
};
use vodgrab_core::source::{segment_parser, ResolvedSource};

pub async fn run_inspect(cfg: &VodgrabConfig, url: &str, rendition: Option<&str>) -> Result<()> {
    let url = Url::parse(url).with_context(|| format!("invalid URL: {url}"))?;
    let fetch = cfg.fetch_options();
    let rendition = rendition.map(str::to_string);
    let listing = tokio::task::spawn_blocking(move || inspect(&url, rendition.as_deref(), &fetch))
        .await
        .context("inspect task join")??;
    print!("{listing}");
    Ok(())
}

fn inspect(url: &Url, rendition: Option<&str>, fetch: &FetchOptions) -> Result<String> {
    let body = fetch_playlist(url, fetch)?;
    let text = String::from_utf8_lossy(&body);
    if !is_source_list(&text) {
        let media: PlaylistResult<Segment> = segment_parser()?.parse_str(url, &text)?;
        return Ok(format_segments(ResolvedSource::from_media_playlist(media, None)));
    }

    let sources: PlaylistResult<RenditionRef> = PlaylistParser::new().parse_str(url, &text)?;
    let Some(group) = rendition else {
        return Ok(format_renditions(&sources.entries));
    };
    let chosen = sources
        .rendition(group)
        .ok_or_else(|| anyhow!("rendition group {group:?} not listed in {url}"))?;
    let media: PlaylistResult<Segment> = segment_parser()?.fetch(&chosen.playlist_location, fetch)?;
    Ok(format_segments(ResolvedSource::from_media_playlist(media, None)))
}

pub(crate) fn is_source_list(text: &str) -> bool {
    text.lines().any(|l| l.trim_start().starts_with("#EXT-X-STREAM-INF"))
}

pub(crate) fn format_renditions(renditions: &[RenditionRef]) -> String {
    let mut out = format!("{:<12} {:>10} {:<28} {}\n", "GROUP", "BANDWIDTH", "CODECS", "PLAYLIST");
    for r in renditions {
        out.push_str(&format!(
            "{:<12} {:>10} {:<28} {}\n",
            r.group_id,
            r.bandwidth_bps,
            r.codecs.join(","),
            r.playlist_location
        ));
    }
    out
}

pub(crate) fn format_segments(source: ResolvedSource) -> String {
    let mut out = format!("{:<6} {:>10} {:<6} {}\n", "PART", "SECONDS", "MUTED", "URL");
    for (i, s) in source.segments.iter().enumerate() {
        out.push_str(&format!(
            "{:<6} {:>10} {:<6} {}\n",
            i + 1,
            format_seconds(s.expected_duration_ms),
            if s.muted { "yes" } else { "" },
            s.location
        ));
    }
    out.push_str(&format!(
        "{} segments, {} muted, total {}s, {}\n",
        source.segments.len(),
        source.muted_count,
        format_seconds(source.total_duration_ms),
        if source.ended { "ended" } else { "live" }
    ));
    out
}

fn format_seconds(ms: i64) -> String {
    if ms < 0 {
        return "?".to_string();
    }
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

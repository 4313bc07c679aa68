//! Tests for inspect, status, completions and manpage.

use super::parse;
use crate::cli::commands::inspect::{format_renditions, format_segments, is_source_list};
use crate::cli::commands::status::status_counts;
use crate::cli::progress::{format_line, format_percent};
use vodgrab_core::progress::ProgressSnapshot;
use crate::cli::CliCommand;
use clap_complete::Shell;
use url::Url;
use vodgrab_core::playlist::{PlaylistParser, PlaylistResult, RenditionRef, Segment};
use vodgrab_core::source::{segment_parser, ResolvedSource};

#[test]
fn cli_parse_inspect() {
    match parse(&["vodgrab", "inspect", "http://h/master.m3u8"]) {
        CliCommand::Inspect { url, rendition } => {
            assert_eq!(url, "http://h/master.m3u8");
            assert!(rendition.is_none());
        }
        _ => panic!("expected Inspect"),
    }
    match parse(&["vodgrab", "inspect", "http://h/m.m3u8", "--rendition", "720p60"]) {
        CliCommand::Inspect { rendition, .. } => assert_eq!(rendition.as_deref(), Some("720p60")),
        _ => panic!("expected Inspect with --rendition"),
    }
}

#[test]
fn cli_parse_status() {
    match parse(&["vodgrab", "status", "/data/v1-x"]) {
        CliCommand::Status { dir } => assert_eq!(dir, std::path::PathBuf::from("/data/v1-x")),
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_completions_and_manpage() {
    match parse(&["vodgrab", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
    assert!(matches!(parse(&["vodgrab", "manpage"]), CliCommand::Manpage));
}

#[test]
fn source_list_detection() {
    assert!(is_source_list("#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\na.m3u8\n"));
    assert!(!is_source_list("#EXTM3U\n#EXTINF:10,\n0.ts\n"));
}

#[test]
fn renditions_are_listed() {
    let base = Url::parse("http://h/vod/master.m3u8").unwrap();
    let text = "#EXTM3U\n\
        #EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID=\"chunked\",NAME=\"1080p\"\n\
        #EXT-X-STREAM-INF:BANDWIDTH=6000000,CODECS=\"avc1.64002A,mp4a.40.2\",VIDEO=\"chunked\"\n\
        chunked/index.m3u8\n";
    let parsed: PlaylistResult<RenditionRef> = PlaylistParser::new().parse_str(&base, text).unwrap();
    let listing = format_renditions(&parsed.entries);
    let row = listing.lines().nth(1).unwrap();
    assert!(row.starts_with("chunked"));
    assert!(row.contains("6000000"));
    assert!(row.contains("avc1.64002A,mp4a.40.2"));
    assert!(row.ends_with("http://h/vod/chunked/index.m3u8"));
}

#[test]
fn segments_are_listed_with_summary() {
    let base = Url::parse("http://h/vod/chunked/index.m3u8").unwrap();
    let text = "#EXTM3U\n#EXTINF:10.000,\n0.ts\n#EXTINF:4.5,\n1-muted.ts\n";
    let media: PlaylistResult<Segment> = segment_parser().unwrap().parse_str(&base, text).unwrap();
    let listing = format_segments(ResolvedSource::from_media_playlist(media, None));
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].contains("10.000"));
    assert!(lines[2].contains("4.500"));
    assert!(lines[2].contains("yes"));
    assert_eq!(lines[3], "2 segments, 1 muted, total 14.500s, live");
}

#[test]
fn status_counts_include_failures() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    let text = r#"{
  "http://h/0.ts": "DOWNLOADED",
  "http://h/1.ts": "FAILED",
  "http://h/2.ts": "DOWNLOADED",
  "http://h/3.ts": "FAILED",
  "http://h/4.ts": "FAILED"
}"#;
    std::fs::write(&path, text).unwrap();
    assert_eq!(status_counts(&path).unwrap(), (2, 3));
    // Read-only: the failures are still on disk.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn percent_formatting() {
    assert_eq!(format_percent(500, 1000), "50.0%");
    assert_eq!(format_percent(1000, 1000), "100.0%");
    assert_eq!(format_percent(0, 0), "?");
}

#[test]
fn progress_line_uses_snapshot_counts() {
    let snapshot = ProgressSnapshot { value: 250, resolution: 1000, downloaded: 3, failed: 1 };
    assert_eq!(format_line("v1", &snapshot), "  v1: 25.0%  (3 done, 1 failed)");
}

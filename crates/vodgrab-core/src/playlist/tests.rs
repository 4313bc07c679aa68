use std::sync::Arc;

use url::Url;

use super::*;

fn base() -> Url {
    Url::parse("http://h/p/index.m3u8").unwrap()
}

#[test]
fn minimal_media_playlist() {
    let text = "#EXTM3U\n#EXTINF:9.009,\nseg1.ts\n#EXT-X-ENDLIST\n";
    let result: PlaylistResult<Segment> = PlaylistParser::new().parse_str(&base(), text).unwrap();
    assert_eq!(
        result.entries,
        vec![Segment::new(Url::parse("http://h/p/seg1.ts").unwrap(), 9009)]
    );
    assert!(result.is_ended());
    assert!(!result.properties.contains(&PropertyKey::PendingDuration));
}

#[test]
fn missing_header_is_malformed() {
    let text = "#EXTINF:9.009,\nseg1.ts\n";
    let err = PlaylistParser::new()
        .parse_str::<Segment>(&base(), text)
        .unwrap_err();
    assert!(err.is_malformed(), "{err}");
}

#[test]
fn empty_and_blank_input_is_malformed() {
    let parser = PlaylistParser::new();
    assert!(parser.parse_str::<Segment>(&base(), "").unwrap_err().is_malformed());
    assert!(parser
        .parse_str::<Segment>(&base(), "\n   \n\t\n")
        .unwrap_err()
        .is_malformed());
}

#[test]
fn header_may_follow_blank_lines_and_padding() {
    let text = "\n\n   #EXTM3U   \n  a.ts  \n";
    let result: PlaylistResult<Segment> = PlaylistParser::new().parse_str(&base(), text).unwrap();
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].location.as_str(), "http://h/p/a.ts");
    assert_eq!(result.entries[0].expected_duration_ms, -1);
    assert!(!result.is_ended());
}

#[test]
fn duration_does_not_leak_into_next_segment() {
    let text = "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:10\n#EXT-X-PLAYLIST-TYPE:VOD\n\
                #EXTINF:10.000,\n0.ts\n1.ts\n#EXTINF:4.250,\n/abs/2.ts\n";
    let result: PlaylistResult<Segment> = PlaylistParser::new().parse_str(&base(), text).unwrap();
    let durations: Vec<i64> = result.entries.iter().map(|s| s.expected_duration_ms).collect();
    assert_eq!(durations, vec![10_000, -1, 4250]);
    assert_eq!(result.entries[2].location.as_str(), "http://h/abs/2.ts");
    assert_eq!(result.properties.int(&PropertyKey::Version), Some(3));
    assert_eq!(result.properties.int(&PropertyKey::TargetDuration), Some(10));
    assert_eq!(result.properties.text(&PropertyKey::PlaylistType), Some("VOD"));
}

#[test]
fn unknown_tags_and_comments_are_ignored() {
    let text = "#EXTM3U\n#EXT-X-SOMETHING-NEW:1,2\n# just a comment\n#EXTINF:1.000,\nx.ts\n";
    let result: PlaylistResult<Segment> = PlaylistParser::new().parse_str(&base(), text).unwrap();
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].expected_duration_ms, 1000);
    assert!(result.properties.is_empty());
}

#[test]
fn bad_integer_tag_is_malformed() {
    let text = "#EXTM3U\n#EXT-X-VERSION:three\n";
    let err = PlaylistParser::new()
        .parse_str::<Segment>(&base(), text)
        .unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn rendition_mode_purges_per_entry_keys() {
    let text = r#"#EXTM3U
#EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID="chunked",NAME="Source",AUTOSELECT=YES,DEFAULT=YES
#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=3000000,CODECS="avc1.4D401F,mp4a.40.2",VIDEO="chunked"
chunked/index-dvr.m3u8
#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=900000,CODECS="avc1.4D401E,mp4a.40.2",VIDEO="medium"
medium/index-dvr.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=100
audio/index.m3u8
"#;
    let base = Url::parse("http://h/vod/master.m3u8").unwrap();
    let mut parser = PlaylistParser::new();
    parser
        .add_handler(
            "EXT-X-TWITCH-INFO",
            Arc::new(|_: &Url, values: &[String], mut state: Properties| {
                state.insert(
                    PropertyKey::Custom("INFO".into()),
                    PropertyValue::TextList(values.to_vec()),
                );
                Ok::<_, PlaylistError>(state)
            }),
        )
        .unwrap();
    let text = format!("{text}#EXT-X-TWITCH-INFO:NODE=\"x\"\n");
    let result: PlaylistResult<RenditionRef> = parser.parse_str(&base, &text).unwrap();

    assert_eq!(result.entries.len(), 3);
    let chunked = result.rendition("chunked").unwrap();
    assert_eq!(chunked.bandwidth_bps, 3_000_000);
    assert_eq!(chunked.codecs, vec!["avc1.4D401F", "mp4a.40.2"]);
    assert_eq!(
        chunked.playlist_location.as_str(),
        "http://h/vod/chunked/index-dvr.m3u8"
    );

    let medium = result.rendition("medium").unwrap();
    assert_eq!(medium.bandwidth_bps, 900_000);

    // No GROUP-ID or VIDEO left over from earlier entries.
    let audio = &result.entries[2];
    assert_eq!(audio.group_id, "");
    assert_eq!(audio.bandwidth_bps, 100);
    assert!(audio.codecs.is_empty());

    assert!(result.properties.iter().all(|(k, _)| k.namespace().is_none()));
    assert!(result
        .properties
        .contains(&PropertyKey::Custom("INFO".into())));
}

#[test]
fn handlers_added_to_one_parser_stay_local() {
    let mut custom = PlaylistParser::new();
    custom
        .add_handler(
            "EXT-X-MARK",
            Arc::new(|_: &Url, _: &[String], mut state: Properties| {
                state.insert(PropertyKey::Custom("MARK".into()), PropertyValue::Bool(true));
                Ok::<_, PlaylistError>(state)
            }),
        )
        .unwrap();
    let text = "#EXTM3U\n#EXT-X-MARK\n";
    let with: PlaylistResult<Segment> = custom.parse_str(&base(), text).unwrap();
    let without: PlaylistResult<Segment> = PlaylistParser::new().parse_str(&base(), text).unwrap();
    assert_eq!(
        with.properties.flag(&PropertyKey::Custom("MARK".into())),
        Some(true)
    );
    assert!(without.properties.is_empty());
}

#[test]
fn invalid_utf8_is_malformed() {
    let bytes: &[u8] = b"#EXTM3U\n#EXTINF:1.000,\n\xff\xfe.ts\n";
    let err = PlaylistParser::new()
        .parse::<Segment, _>(&base(), bytes)
        .unwrap_err();
    assert!(err.is_malformed(), "{err}");
}

#[test]
fn playlist_scoped_tag_twice_is_malformed() {
    let parser = PlaylistParser::new();
    for text in [
        "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-VERSION:4\n",
        "#EXTM3U\n#EXT-X-ENDLIST\n#EXT-X-ENDLIST\n",
        "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1,BANDWIDTH=2\na.m3u8\n",
    ] {
        let err = parser.parse_str::<Segment>(&base(), text).unwrap_err();
        assert!(err.is_malformed(), "{text:?}: {err}");
    }
}

#[test]
fn later_extinf_replaces_pending_duration() {
    let text = "#EXTM3U\n#EXTINF:1.000,\n#EXTINF:2.000,\na.ts\n";
    let result: PlaylistResult<Segment> = PlaylistParser::new().parse_str(&base(), text).unwrap();
    assert_eq!(result.entries[0].expected_duration_ms, 2000);
}

#[test]
fn later_media_tag_replaces_unconsumed_attributes() {
    let text = "#EXTM3U\n\
        #EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aac\",LANGUAGE=\"en\"\n\
        #EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID=\"chunked\"\n\
        #EXT-X-STREAM-INF:BANDWIDTH=10\n\
        chunked.m3u8\n";
    let result: PlaylistResult<RenditionRef> = PlaylistParser::new().parse_str(&base(), text).unwrap();
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].group_id, "chunked");
}

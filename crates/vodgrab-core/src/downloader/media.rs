use std::fmt;

use crate::source::SourceKind;

/// Content type a part response must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedMedia {
    /// Any content type mentioning `video` (flat archives).
    AnyVideo,
    /// Compatible with `video/MP2T` (playlist segments).
    TransportStream,
}

impl ExpectedMedia {
    pub fn for_source(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Flat => ExpectedMedia::AnyVideo,
            SourceKind::Playlist => ExpectedMedia::TransportStream,
        }
    }

    /// A missing content type never matches.
    pub fn accepts(self, content_type: Option<&str>) -> bool {
        let Some(content_type) = content_type else {
            return false;
        };
        match self {
            ExpectedMedia::AnyVideo => content_type.to_ascii_lowercase().contains("video"),
            ExpectedMedia::TransportStream => compatible(content_type, "video", "mp2t"),
        }
    }
}

impl fmt::Display for ExpectedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedMedia::AnyVideo => f.write_str("video/*"),
            ExpectedMedia::TransportStream => f.write_str("video/MP2T"),
        }
    }
}

/// Media-type compatibility: case-insensitive, parameters ignored, `*` matches anything.
fn compatible(content_type: &str, ty: &str, subtype: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    let Some((t, s)) = essence.split_once('/') else {
        return false;
    };
    let (t, s) = (t.trim(), s.trim());
    let type_ok = t == "*" || t.eq_ignore_ascii_case(ty);
    let subtype_ok = s == "*" || s.eq_ignore_ascii_case(subtype);
    type_ok && subtype_ok
}

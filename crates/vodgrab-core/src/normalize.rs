//! Folds runs of segments that point at the same physical file.
//!
//! Some upstream playlists list one file several times, each entry carrying a
//! different `start_offset` query value and a short duration. Fetching each
//! entry would download the same bytes repeatedly, so consecutive entries with
//! the same URL path are merged into one segment.

use url::Url;

use crate::playlist::Segment;

const START_OFFSET: &str = "start_offset";

/// Merges consecutive segments that share a URL path.
///
/// The merged segment keeps the last member's URL (its other query values,
/// such as signatures, are the freshest) with `start_offset` taken from the
/// first member; its duration is the sum of the run. If any run cannot be
/// merged the input is returned unchanged.
pub fn merge_aliased_segments(segments: Vec<Segment>) -> Vec<Segment> {
    match try_merge(&segments) {
        Some(merged) => {
            if merged.len() != segments.len() {
                tracing::debug!(
                    before = segments.len(),
                    after = merged.len(),
                    "merged aliased segments"
                );
            }
            merged
        }
        None => {
            tracing::warn!("could not merge aliased segments; keeping playlist as listed");
            segments
        }
    }
}

fn try_merge(segments: &[Segment]) -> Option<Vec<Segment>> {
    let mut out = Vec::with_capacity(segments.len());
    let mut iter = segments.iter();
    let Some(mut first) = iter.next() else {
        return Some(out);
    };
    let mut last = first;
    let mut duration = first.expected_duration_ms;

    for next in iter {
        if next.location.path() == last.location.path() {
            duration = add_duration(duration, next.expected_duration_ms);
            last = next;
            continue;
        }
        out.push(close_run(first, last, duration)?);
        first = next;
        last = next;
        duration = next.expected_duration_ms;
    }
    out.push(close_run(first, last, duration)?);
    Some(out)
}

/// Unknown durations (-1) poison the sum.
fn add_duration(acc: i64, next: i64) -> i64 {
    if acc < 0 || next < 0 {
        -1
    } else {
        acc + next
    }
}

fn close_run(first: &Segment, last: &Segment, duration: i64) -> Option<Segment> {
    if std::ptr::eq(first, last) {
        return Some(first.clone());
    }
    let offset = query_value(&first.location, START_OFFSET)?;
    let location = with_query_value(&last.location, START_OFFSET, offset)?;
    Some(Segment {
        location,
        expected_duration_ms: duration,
        muted: first.muted || last.muted,
    })
}

/// Raw (still percent-encoded) value of `key` in the query string.
fn query_value<'a>(url: &'a Url, key: &str) -> Option<&'a str> {
    url.query()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Replaces the value of `key` without re-encoding the rest of the query.
fn with_query_value(url: &Url, key: &str, value: &str) -> Option<Url> {
    let query = url.query()?;
    let mut found = false;
    let rewritten: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((k, _)) if k == key => {
                found = true;
                format!("{k}={value}")
            }
            _ => pair.to_string(),
        })
        .collect();
    if !found {
        return None;
    }
    let mut url = url.clone();
    url.set_query(Some(&rewritten.join("&")));
    Some(url)
}

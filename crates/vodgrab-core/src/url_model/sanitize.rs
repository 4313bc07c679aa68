//! Storage directory naming.

/// Directory name for a broadcast: `{id}-{title}`, with every character of
/// the id and the title outside `[A-Za-z0-9.-]` replaced by `_`. The result is
/// always a single path component.
pub fn storage_dir_name(id: &str, title: &str) -> String {
    format!("{}-{}", sanitize(id), sanitize(title))
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

//! Attribute-list splitting for `#TAG:a,b="c,d"` values.

/// Splits `input` on commas that are outside double quotes.
///
/// A backslash escapes the next character whatever the quote state, so `\"`
/// never toggles quoting and `\,` never splits. Escapes are kept in the output.
pub fn split_unquoted(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => {
                in_quote = !in_quote;
                current.push(c);
            }
            ',' if !in_quote => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Strips one matching pair of leading/trailing double quotes.
pub fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_values() {
        assert_eq!(split_unquoted("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_unquoted("9.009,"), vec!["9.009", ""]);
    }

    #[test]
    fn comma_inside_quotes_is_kept() {
        assert_eq!(
            split_unquoted(r#"BANDWIDTH=1,CODECS="avc1.4d40,mp4a.40.2",VIDEO="chunked""#),
            vec![
                "BANDWIDTH=1",
                r#"CODECS="avc1.4d40,mp4a.40.2""#,
                r#"VIDEO="chunked""#
            ]
        );
    }

    #[test]
    fn backslash_escapes_quote_and_comma() {
        assert_eq!(split_unquoted(r#"A="x\",y",B"#), vec![r#"A="x\",y""#, "B"]);
        assert_eq!(split_unquoted(r"a\,b,c"), vec![r"a\,b", "c"]);
    }

    #[test]
    fn unquote_strips_one_pair_only() {
        assert_eq!(unquote(r#""chunked""#), "chunked");
        assert_eq!(unquote(r#"""x"""#), r#""x""#);
        assert_eq!(unquote(r#""open"#), r#""open"#);
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("bare"), "bare");
    }
}

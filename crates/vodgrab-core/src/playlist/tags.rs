//! Tag handler registry and the default `#EXT` handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use url::Url;

use super::attributes::unquote;
use super::error::PlaylistError;
use super::property::{Properties, PropertyKey, PropertyValue, TagNamespace};

/// Folds one tag line into the tag state.
///
/// Receives the playlist URI (for relative `URI=` attributes), the comma-split
/// values after the first `:` (empty for bare tags) and the current state, and
/// returns the next state.
pub type TagHandler =
    Arc<dyn Fn(&Url, &[String], Properties) -> Result<Properties, PlaylistError> + Send + Sync>;

/// Handlers keyed by tag name (without the leading `#`).
#[derive(Clone)]
pub struct TagRegistry {
    handlers: HashMap<String, TagHandler>,
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TagRegistry").field("tags", &names).finish()
    }
}

impl Default for TagRegistry {
    /// Copy of the shared default handler set.
    fn default() -> Self {
        defaults().clone()
    }
}

impl TagRegistry {
    /// Registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `name`. Fails if the name is already taken.
    pub fn add_handler(&mut self, name: &str, handler: TagHandler) -> Result<(), PlaylistError> {
        if self.handlers.contains_key(name) {
            return Err(PlaylistError::DuplicateHandler(name.to_string()));
        }
        self.handlers.insert(name.to_string(), handler);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TagHandler> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

/// Default handler set, built once and cloned into each parser.
fn defaults() -> &'static TagRegistry {
    static DEFAULTS: OnceLock<TagRegistry> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        let mut reg = TagRegistry::empty();
        let entries: [(&str, TagHandler); 7] = [
            ("EXT-X-VERSION", int_property("EXT-X-VERSION", PropertyKey::Version)),
            (
                "EXT-X-TARGETDURATION",
                int_property("EXT-X-TARGETDURATION", PropertyKey::TargetDuration),
            ),
            ("EXT-X-PLAYLIST-TYPE", Arc::new(playlist_type)),
            ("EXTINF", Arc::new(extinf)),
            ("EXT-X-ENDLIST", Arc::new(endlist)),
            ("EXT-X-MEDIA", Arc::new(media)),
            ("EXT-X-STREAM-INF", Arc::new(stream_inf)),
        ];
        for (name, handler) in entries {
            reg.handlers.insert(name.to_string(), handler);
        }
        reg
    })
}

/// Parses `"<seconds>.<fraction>"` into milliseconds.
///
/// The fraction is read as milliseconds: it is padded or cut to three digits,
/// so `9.009` is 9009 and `4.5` is 4500.
pub fn parse_duration_ms(value: &str) -> Result<i64, PlaylistError> {
    let value = value.trim();
    let invalid = || PlaylistError::malformed(format!("invalid duration {value:?}"));
    let (secs, frac) = value.split_once('.').unwrap_or((value, ""));
    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let secs: i64 = secs.parse().map_err(|_| invalid())?;
    let mut millis = 0i64;
    for (i, digit) in frac.bytes().take(3).enumerate() {
        millis += i64::from(digit - b'0') * 10i64.pow(2 - i as u32);
    }
    secs.checked_mul(1000)
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(invalid)
}

fn first_value<'a>(tag: &str, values: &'a [String]) -> Result<&'a str, PlaylistError> {
    values
        .first()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PlaylistError::malformed(format!("#{tag} without a value")))
}

fn parse_int(tag: &str, value: &str) -> Result<i64, PlaylistError> {
    value
        .trim()
        .parse()
        .map_err(|_| PlaylistError::malformed(format!("#{tag}: expected integer, got {value:?}")))
}

fn int_property(tag: &'static str, key: PropertyKey) -> TagHandler {
    Arc::new(
        move |_base: &Url, values: &[String], mut state: Properties| -> Result<Properties, PlaylistError> {
            let value = parse_int(tag, first_value(tag, values)?)?;
            state.set(key.clone(), PropertyValue::Int(value))?;
            Ok(state)
        },
    )
}

fn playlist_type(_base: &Url, values: &[String], mut state: Properties) -> Result<Properties, PlaylistError> {
    let value = first_value("EXT-X-PLAYLIST-TYPE", values)?;
    state.set(PropertyKey::PlaylistType, PropertyValue::Text(value.to_string()))?;
    Ok(state)
}

fn extinf(_base: &Url, values: &[String], mut state: Properties) -> Result<Properties, PlaylistError> {
    let ms = parse_duration_ms(first_value("EXTINF", values)?)?;
    state.set(PropertyKey::PendingDuration, PropertyValue::Int(ms))?;
    Ok(state)
}

fn endlist(_base: &Url, _values: &[String], mut state: Properties) -> Result<Properties, PlaylistError> {
    state.set(PropertyKey::Ended, PropertyValue::Bool(true))?;
    Ok(state)
}

/// Splits `KEY=VALUE` attributes; entries without `=` are ignored.
fn attributes(values: &[String]) -> impl Iterator<Item = (&str, &str)> {
    values
        .iter()
        .filter_map(|v| v.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
}

/// A new `#EXT-X-MEDIA` replaces the attributes of an earlier one that no
/// content line consumed.
fn media(base: &Url, values: &[String], mut state: Properties) -> Result<Properties, PlaylistError> {
    state.purge_namespace(TagNamespace::Media);
    for (key, value) in attributes(values) {
        let (k, v) = match key {
            "URI" => {
                let uri = base.join(unquote(value)).map_err(|e| {
                    PlaylistError::malformed(format!("#EXT-X-MEDIA URI {value:?}: {e}"))
                })?;
                (PropertyKey::MediaUri, PropertyValue::Uri(uri))
            }
            "LANGUAGE" => (
                PropertyKey::MediaLanguage,
                PropertyValue::Locale(unquote(value).to_string()),
            ),
            "DEFAULT" => (PropertyKey::MediaDefault, PropertyValue::Bool(value == "YES")),
            "AUTOSELECT" => (PropertyKey::MediaAutoselect, PropertyValue::Bool(value == "YES")),
            other => (
                PropertyKey::raw(TagNamespace::Media, other),
                PropertyValue::Text(unquote(value).to_string()),
            ),
        };
        state.set(k, v)?;
    }
    Ok(state)
}

fn stream_inf(_base: &Url, values: &[String], mut state: Properties) -> Result<Properties, PlaylistError> {
    state.purge_namespace(TagNamespace::StreamInf);
    for (key, value) in attributes(values) {
        let (k, v) = match key {
            "BANDWIDTH" => (
                PropertyKey::StreamBandwidth,
                PropertyValue::Int(parse_int("EXT-X-STREAM-INF", value)?),
            ),
            "PROGRAM-ID" => (
                PropertyKey::StreamProgramId,
                PropertyValue::Int(parse_int("EXT-X-STREAM-INF", value)?),
            ),
            "CODECS" => (
                PropertyKey::StreamCodecs,
                PropertyValue::TextList(
                    unquote(value).split(',').map(|c| c.trim().to_string()).collect(),
                ),
            ),
            other => (
                PropertyKey::raw(TagNamespace::StreamInf, other),
                PropertyValue::Text(unquote(value).to_string()),
            ),
        };
        state.set(k, v)?;
    }
    Ok(state)
}

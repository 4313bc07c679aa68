//! Typed tag state accumulated while a playlist is read.

use std::collections::BTreeMap;
use url::Url;

use super::error::PlaylistError;

/// Namespace for attribute-list keys that have no dedicated [`PropertyKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagNamespace {
    /// `#EXT-X-MEDIA`
    Media,
    /// `#EXT-X-STREAM-INF`
    StreamInf,
}

impl TagNamespace {
    pub fn tag(self) -> &'static str {
        match self {
            TagNamespace::Media => "EXT-X-MEDIA",
            TagNamespace::StreamInf => "EXT-X-STREAM-INF",
        }
    }
}

/// Name of a property in the tag state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    Version,
    TargetDuration,
    PlaylistType,
    /// Duration of the next content line; consumed by segment emit.
    PendingDuration,
    Ended,
    MediaUri,
    MediaLanguage,
    MediaDefault,
    MediaAutoselect,
    StreamBandwidth,
    StreamProgramId,
    StreamCodecs,
    /// Unrecognized attribute key, kept verbatim under its tag's namespace.
    Raw { namespace: TagNamespace, name: String },
    /// Key owned by a handler registered through `add_handler`.
    Custom(String),
}

impl PropertyKey {
    pub fn raw(namespace: TagNamespace, name: impl Into<String>) -> Self {
        PropertyKey::Raw {
            namespace,
            name: name.into(),
        }
    }

    /// Namespace this key belongs to, if it was produced by an attribute-list tag.
    pub fn namespace(&self) -> Option<TagNamespace> {
        match self {
            PropertyKey::MediaUri
            | PropertyKey::MediaLanguage
            | PropertyKey::MediaDefault
            | PropertyKey::MediaAutoselect => Some(TagNamespace::Media),
            PropertyKey::StreamBandwidth
            | PropertyKey::StreamProgramId
            | PropertyKey::StreamCodecs => Some(TagNamespace::StreamInf),
            PropertyKey::Raw { namespace, .. } => Some(*namespace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Int(i64),
    Text(String),
    TextList(Vec<String>),
    Bool(bool),
    Locale(String),
    Uri(Url),
}

/// Tag state: threaded by value through every line step of the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<PropertyKey, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: PropertyKey, value: PropertyValue) -> Option<PropertyValue> {
        self.values.insert(key, value)
    }

    /// Write-once insert: a key that is already present is a malformed
    /// playlist. [`PropertyKey::PendingDuration`] is exempt; a later `#EXTINF`
    /// before the same content line replaces the earlier one.
    pub fn set(&mut self, key: PropertyKey, value: PropertyValue) -> Result<(), PlaylistError> {
        if key != PropertyKey::PendingDuration && self.values.contains_key(&key) {
            return Err(PlaylistError::malformed(format!("{key:?} set twice")));
        }
        self.values.insert(key, value);
        Ok(())
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<PropertyValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &PropertyKey) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &PropertyValue)> {
        self.values.iter()
    }

    pub fn int(&self, key: &PropertyKey) -> Option<i64> {
        match self.values.get(key) {
            Some(PropertyValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, key: &PropertyKey) -> Option<&str> {
        match self.values.get(key) {
            Some(PropertyValue::Text(v)) | Some(PropertyValue::Locale(v)) => Some(v),
            _ => None,
        }
    }

    pub fn flag(&self, key: &PropertyKey) -> Option<bool> {
        match self.values.get(key) {
            Some(PropertyValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn ended(&self) -> bool {
        self.flag(&PropertyKey::Ended).unwrap_or(false)
    }

    /// Drops every key produced by the given attribute-list tag.
    pub fn purge_namespace(&mut self, namespace: TagNamespace) {
        self.values.retain(|k, _| k.namespace() != Some(namespace));
    }
}

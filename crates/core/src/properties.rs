use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Prefix applied to keys derived from resource tags.
pub const TAG_PREFIX: &str = "tag:";

/// Ordered key/value metadata describing one resource.
///
/// Filters and reports upstream match on these keys, so the names used by a
/// resource kind are part of its public contract. Tag-derived entries are
/// stored under `tag:<key>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a tag-derived entry. Tags with an empty key are ignored.
    #[must_use]
    pub fn set_tag(mut self, key: &str, value: impl Into<String>) -> Self {
        if !key.is_empty() {
            self.0.insert(format!("{TAG_PREFIX}{key}"), value.into());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Look up a tag-derived entry by the original tag key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.get(&format!("{TAG_PREFIX}{key}"))
    }

    /// Iterate over tag-derived entries as `(tag key, value)` pairs.
    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|(k, v)| {
            k.strip_prefix(TAG_PREFIX)
                .map(|tag| (tag, v.as_str()))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}: {v:?}")?;
        }
        f.write_str("]")
    }
}

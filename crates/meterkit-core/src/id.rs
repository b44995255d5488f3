//! Meter identity: a name plus an unordered set of tags.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// One `key=value` tag. Ordered so tag sets compare independently of the
/// order callers supplied them in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Lookup key for a meter inside a registry.
///
/// Two ids are equal iff their names match and their tag sets match as sets.
/// The same key may appear more than once with different values; each
/// `(key, value)` pair is a distinct tag. Empty names are accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MeterId {
    name: String,
    tags: BTreeSet<Tag>,
}

impl MeterId {
    /// Untagged identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Identity with the given `(key, value)` pairs.
    pub fn with_tags<K, V>(name: impl Into<String>, tags: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut id = Self::new(name);
        id.tags.extend(tags.into_iter().map(|(k, v)| Tag::new(k, v)));
        id
    }

    /// Builder step: add one tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(Tag::new(key, value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// First value recorded under `key`, in tag order.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_str())
    }

    /// Same identity with `extra` merged in.
    pub(crate) fn merged(&self, extra: &BTreeSet<Tag>) -> Self {
        if extra.is_empty() {
            return self.clone();
        }
        let mut id = self.clone();
        id.tags.extend(extra.iter().cloned());
        id
    }
}

impl fmt::Display for MeterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.tags.is_empty() {
            return Ok(());
        }
        let tags = self
            .tags
            .iter()
            .map(|t| format!("{}={}", t.key, t.value))
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{{{tags}}}")
    }
}

impl From<&str> for MeterId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MeterId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

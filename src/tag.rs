//! Binding tags.
//!
//! A tag is a comma separated list of keys: `<marker>[,<key>=<value>][,<flag>...]`.
//! The first key selects a name parser when it is bare (no `=`); every key,
//! marker included, lands in the key map so parsers can read options such as
//! `name=page` or the `all` flag.
//!
//! ```
//! use param_bind::Tag;
//!
//! let tag = Tag::parse("query,name=page,default=1").unwrap();
//! assert_eq!(tag.marker(), Some("query"));
//! assert_eq!(tag.get("name"), Some("page"));
//! assert_eq!(tag.get("default"), Some("1"));
//! ```

use std::collections::HashMap;
use std::fmt;

/// Flag requesting that every value of a source be bound into one struct or map.
pub const ALL: &str = "all";

/// Key holding the source-side name of a single bound value.
pub const NAME: &str = "name";

/// Key holding a fallback value used when the source has none.
pub const DEFAULT: &str = "default";

/// A parsed binding tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    marker: Option<String>,
    keys: Vec<String>,
    values: HashMap<String, String>,
}

/// Why a tag failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    EmptyKey(usize),
    DuplicateKey(String),
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::EmptyKey(pos) => write!(f, "empty key at position {}", pos),
            TagError::DuplicateKey(key) => write!(f, "duplicate key `{}`", key),
        }
    }
}

impl std::error::Error for TagError {}

impl Tag {
    /// Parse a raw tag. Empty segments (`query,,all`) are skipped.
    pub fn parse(raw: &str) -> Result<Self, TagError> {
        let mut tag = Tag::default();
        for (pos, segment) in raw.split(',').enumerate() {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = match segment.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (segment, ""),
            };
            if key.is_empty() {
                return Err(TagError::EmptyKey(pos));
            }
            if tag.values.contains_key(key) {
                return Err(TagError::DuplicateKey(key.to_string()));
            }
            if tag.keys.is_empty() && !segment.contains('=') {
                tag.marker = Some(key.to_string());
            }
            tag.keys.push(key.to_string());
            tag.values.insert(key.to_string(), value.to_string());
        }
        Ok(tag)
    }

    /// The marker key, if the tag starts with a bare key.
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Value of `key`. Flags map to `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether `key` appears at all.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Whether the tag requests bind-all mode.
    pub fn binds_all(&self) -> bool {
        self.has(ALL)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The whole key map.
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match self.values.get(key) {
                Some(v) if !v.is_empty() => write!(f, "{}={}", key, v)?,
                _ => f.write_str(key)?,
            }
        }
        Ok(())
    }
}

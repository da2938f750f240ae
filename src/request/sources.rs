//! The value sources of a request.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::decode::DecodeError;

/// Ordered multi-valued string map. Keeps insertion order and duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multimap {
    pairs: Vec<(String, String)>,
}

impl Multimap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, keeping earlier values for the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Multimap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Multimap::new();
        for (k, v) in iter {
            map.append(k, v);
        }
        map
    }
}

macro_rules! multimap_source {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name(Multimap);

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn get(&self, key: &str) -> Option<&str> {
                self.0.get(key)
            }

            pub fn get_all(&self, key: &str) -> Vec<&str> {
                self.0.get_all(key)
            }

            pub fn as_multimap(&self) -> &Multimap {
                &self.0
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }
    };
}

multimap_source!(
    /// Decoded query string parameters.
    Query
);
multimap_source!(
    /// Request headers. Names are stored and looked up lowercased.
    Headers
);
multimap_source!(
    /// Cookies sent with the request.
    Cookies
);
multimap_source!(
    /// Path parameters captured by the router.
    PathParams
);

impl Query {
    /// Parse a raw query string (without the leading `?`), percent-decoding
    /// keys and values and reading `+` as a space.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Query(url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.append(key, value);
    }
}

impl Headers {
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.0.append(name.to_ascii_lowercase(), value);
    }

    /// First value of header `name`, matched case-insensitively.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase())
    }
}

impl Cookies {
    /// Parse a `Cookie` header value: `a=1; b=2`. Segments without `=` are
    /// skipped; surrounding double quotes are removed from values.
    pub fn parse(header: &str) -> Self {
        let mut cookies = Cookies::new();
        cookies.extend_from_header(header);
        cookies
    }

    pub fn extend_from_header(&mut self, header: &str) {
        for segment in header.split(';') {
            let Some((name, value)) = segment.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            self.0.append(name, value);
        }
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.append(name, value);
    }
}

impl PathParams {
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.append(name, value);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PathParams(iter.into_iter().collect())
    }
}

/// Raw request body.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Body(Vec<u8>);

impl Body {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Body(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        serde_json::from_slice(&self.0).map_err(|e| <DecodeError as serde::de::Error>::custom(e))
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(text) => f.debug_tuple("Body").field(&text).finish(),
            Err(_) => f.debug_tuple("Body").field(&self.0.len()).finish(),
        }
    }
}

/// HTTP method, stored uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method(String);

impl Method {
    pub fn new(method: &str) -> Self {
        Method(method.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Method {
    fn default() -> Self {
        Method("GET".to_string())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! The `ext` metadata bag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Ext keys with a documented meaning.
///
/// Any other key is preserved verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtKey {
    /// Per-session CSRF token, attached by the client and stripped by the server.
    CsrfToken,
}

impl ExtKey {
    /// The key as it appears on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            ExtKey::CsrfToken => "csrfToken",
        }
    }
}

impl fmt::Display for ExtKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extensible metadata carried on every message.
///
/// A thin wrapper over a JSON object. Insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ext(Map<String, Value>);

impl Ext {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Look up a documented key.
    pub fn known(&self, key: ExtKey) -> Option<&Value> {
        self.get(key.as_str())
    }

    /// The CSRF token under the default key, if it is a string.
    pub fn csrf_token(&self) -> Option<&str> {
        self.get_str(ExtKey::CsrfToken.as_str())
    }

    /// Set the CSRF token under the default key.
    pub fn set_csrf_token(&mut self, token: impl Into<String>) {
        self.insert(ExtKey::CsrfToken.as_str(), Value::String(token.into()));
    }

    /// Consume the bag into the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Ext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Ext {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_csrf_helpers() {
        let mut ext = Ext::new();
        assert_eq!(ext.csrf_token(), None);
        ext.set_csrf_token("abc");
        assert_eq!(ext.csrf_token(), Some("abc"));
        assert_eq!(ext.known(ExtKey::CsrfToken), Some(&json!("abc")));

        // A non-string token is not a token.
        ext.insert("csrfToken", json!(42));
        assert_eq!(ext.csrf_token(), None);
    }

    #[test]
    fn test_unknown_keys_survive_serde() {
        let raw = json!({ "auth": { "user": "ann" }, "csrfToken": "t" });
        let ext: Ext = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(ext.len(), 2);
        assert_eq!(serde_json::to_value(&ext).unwrap(), raw);
    }
}

//! Untrusted query-string input.

use std::collections::HashMap;

/// Parameter name to raw string, as received from a query string.
///
/// Absent keys mean "not provided". When a key repeats, the first occurrence
/// wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawInput {
    values: HashMap<String, String>,
}

impl RawInput {
    /// Creates an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an input from decoded `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut input = Self::new();
        for (key, value) in pairs {
            input.insert(key, value);
        }
        input
    }

    /// Records a value unless the key was already seen.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Builder-style [`RawInput::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw value for `name`, if provided.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keys were provided.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

//! Untrusted request parameters
//!
//! A request arrives as an unordered mapping of string keys to string
//! values; nothing in it is trusted until a stage validates it against the
//! resource descriptor. Filter expressions travel in a nested group keyed
//! `q[field_predicate]`, mirroring the usual form-encoding of nested params.

use indexmap::IndexMap;

/// Key of the nested filter-expression group
pub const FILTER_GROUP: &str = "q";

/// The raw, untrusted query parameters of a request
///
/// Created per request and discarded after response serialization.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    entries: IndexMap<String, String>,
    filters: IndexMap<String, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded key/value pairs
    ///
    /// Keys shaped `q[...]` are routed into the filter group; everything
    /// else is kept as a scalar entry. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.set(key.into(), value.into());
        }
        params
    }

    /// Set a single parameter, routing `q[...]` keys into the filter group
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match filter_key(&key) {
            Some(inner) => {
                self.filters.insert(inner.to_string(), value);
            }
            None => {
                self.entries.insert(key, value);
            }
        }
    }

    /// Chainable variant of [`set`](Self::set)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Raw scalar parameter lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Scalar parameter lookup treating an empty string as absent
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// All scalar entries, in insertion order
    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    /// The nested filter-expression group (`q[...]` entries, unwrapped)
    pub fn filters(&self) -> &IndexMap<String, String> {
        &self.filters
    }

    pub fn sort(&self) -> Option<&str> {
        self.get_non_blank("sort")
    }

    pub fn dir(&self) -> Option<&str> {
        self.get_non_blank("dir")
    }

    pub fn fields(&self) -> Option<&str> {
        self.get_non_blank("fields")
    }

    pub fn embed(&self) -> Option<&str> {
        self.get_non_blank("embed")
    }

    pub fn include(&self) -> Option<&str> {
        self.get_non_blank("include")
    }
}

fn filter_key(key: &str) -> Option<&str> {
    key.strip_prefix(FILTER_GROUP)?
        .strip_prefix('[')?
        .strip_suffix(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_params() {
        let params = RequestParams::new().with("page", "2").with("per", "10");
        assert_eq!(params.get("page"), Some("2"));
        assert_eq!(params.get("per"), Some("10"));
        assert_eq!(params.get("sort"), None);
    }

    #[test]
    fn test_filter_group_routing() {
        let params = RequestParams::from_pairs([("q[title_cont]", "Ruby"), ("sort", "id")]);
        assert_eq!(params.filters().get("title_cont"), Some(&"Ruby".to_string()));
        assert_eq!(params.get("sort"), Some("id"));
        assert_eq!(params.get("q[title_cont]"), None);
    }

    #[test]
    fn test_blank_values_treated_as_absent() {
        let params = RequestParams::new().with("fields", "").with("embed", "  ");
        assert_eq!(params.fields(), None);
        assert_eq!(params.embed(), None);
        // The raw entry is still there
        assert_eq!(params.get("fields"), Some(""));
    }

    #[test]
    fn test_later_duplicates_win() {
        let params = RequestParams::from_pairs([("sort", "id"), ("sort", "title")]);
        assert_eq!(params.sort(), Some("title"));
    }

    #[test]
    fn test_malformed_filter_key_stays_scalar() {
        let params = RequestParams::new().with("q[title_cont", "Ruby");
        assert!(params.filters().is_empty());
        assert_eq!(params.get("q[title_cont"), Some("Ruby"));
    }
}

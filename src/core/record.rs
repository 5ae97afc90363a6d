//! Type-erased resource records
//!
//! The pipeline is generic over resource type: a [`Record`] is the erased
//! form of one resource instance, carrying its type tag and an ordered map
//! of attribute values. Preloaded relations ride along so embedding does
//! not refetch what the eager-load stage already declared.

use crate::core::field::FieldValue;
use indexmap::IndexMap;
use std::collections::HashMap;

/// One resource instance, erased to its attribute values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    resource_type: String,
    attributes: IndexMap<String, FieldValue>,
    preloaded: HashMap<String, Vec<Record>>,
}

impl Record {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: IndexMap::new(),
            preloaded: HashMap::new(),
        }
    }

    /// Chainable attribute setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.attributes.insert(field.into(), value.into());
    }

    /// The resource-type tag used for descriptor lookup
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Attribute lookup by field name
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.attributes.get(field)
    }

    /// The record identifier, when the `id` attribute is an integer
    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(FieldValue::as_integer)
    }

    pub fn attributes(&self) -> &IndexMap<String, FieldValue> {
        &self.attributes
    }

    /// Attach records preloaded for a relation by the eager-load stage
    pub fn attach_preloaded(&mut self, relation: impl Into<String>, records: Vec<Record>) {
        self.preloaded.insert(relation.into(), records);
    }

    /// Records preloaded for a relation, if the relation was eager-loaded
    pub fn preloaded(&self, relation: &str) -> Option<&[Record]> {
        self.preloaded.get(relation).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_attributes() {
        let record = Record::new("book")
            .with("id", 1)
            .with("title", "Practical Object-Oriented Design");
        assert_eq!(record.resource_type(), "book");
        assert_eq!(record.id(), Some(1));
        assert_eq!(
            record.get("title").and_then(FieldValue::as_string),
            Some("Practical Object-Oriented Design")
        );
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let record = Record::new("book")
            .with("id", 1)
            .with("title", "x")
            .with("author_id", 3);
        let keys: Vec<&str> = record.attributes().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "title", "author_id"]);
    }

    #[test]
    fn test_id_requires_integer() {
        let record = Record::new("book").with("id", "not-a-number");
        assert_eq!(record.id(), None);
    }

    #[test]
    fn test_record_equality() {
        let a = Record::new("book").with("id", 1);
        let b = Record::new("book").with("id", 1);
        let c = Record::new("book").with("id", 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_preloaded_relations() {
        let mut record = Record::new("book").with("id", 1);
        assert_eq!(record.preloaded("author"), None);

        record.attach_preloaded("author", vec![Record::new("author").with("id", 9)]);
        let preloaded = record.preloaded("author").unwrap();
        assert_eq!(preloaded.len(), 1);
        assert_eq!(preloaded[0].id(), Some(9));
    }
}

//! Resource descriptors and their registry
//!
//! A [`ResourceDescriptor`] is the per-type whitelist the pipeline validates
//! untrusted parameters against: which fields may appear in output, which
//! may be sorted or filtered on, and which relations exist. Descriptors are
//! built once at process start, registered in a [`DescriptorRegistry`] and
//! never mutated afterwards, so they are safe to share across request tasks.

use crate::core::field::FieldValue;
use crate::core::record::Record;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Whether a relation points at one record or many
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// A declared relation from one resource type to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Resource-type tag of the target, resolved through the registry
    pub target_type: String,
    pub cardinality: Cardinality,
}

impl Relation {
    pub fn is_collection(&self) -> bool {
        self.cardinality == Cardinality::Many
    }
}

/// Accessor closure for a presenter-level computed field
///
/// An explicit per-descriptor function table; the presenter consults it
/// before falling back to the record attribute of the same name.
pub type ComputedField = Arc<dyn Fn(&Record) -> FieldValue + Send + Sync>;

/// Static per-type whitelist and relation declaration
#[derive(Clone, Default)]
pub struct ResourceDescriptor {
    resource_type: String,
    exposable_fields: IndexSet<String>,
    sortable_fields: IndexSet<String>,
    filterable_fields: IndexSet<String>,
    relations: IndexMap<String, Relation>,
    computed_fields: HashMap<String, ComputedField>,
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("resource_type", &self.resource_type)
            .field("exposable_fields", &self.exposable_fields)
            .field("sortable_fields", &self.sortable_fields)
            .field("filterable_fields", &self.filterable_fields)
            .field("relations", &self.relations)
            .field(
                "computed_fields",
                &self.computed_fields.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ResourceDescriptor {
    pub fn builder(resource_type: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            descriptor: ResourceDescriptor {
                resource_type: resource_type.into(),
                ..Default::default()
            },
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Fields eligible for output, in declaration order
    pub fn exposable_fields(&self) -> &IndexSet<String> {
        &self.exposable_fields
    }

    pub fn sortable_fields(&self) -> &IndexSet<String> {
        &self.sortable_fields
    }

    pub fn filterable_fields(&self) -> &IndexSet<String> {
        &self.filterable_fields
    }

    pub fn relations(&self) -> &IndexMap<String, Relation> {
        &self.relations
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// The computed accessor for a field, if one was declared
    pub fn computed(&self, field: &str) -> Option<&ComputedField> {
        self.computed_fields.get(field)
    }

    /// Comma-joined exposable field list, used in error messages
    pub fn exposable_list(&self) -> String {
        join(&self.exposable_fields)
    }

    /// Comma-joined sortable field list, used in error messages
    pub fn sortable_list(&self) -> String {
        join(&self.sortable_fields)
    }

    /// Comma-joined filterable field list, used in error messages
    pub fn filterable_list(&self) -> String {
        join(&self.filterable_fields)
    }

    /// Comma-joined relation name list, used in error messages
    pub fn relation_list(&self) -> String {
        self.relations
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn join(set: &IndexSet<String>) -> String {
    set.iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Builder for [`ResourceDescriptor`]
pub struct DescriptorBuilder {
    descriptor: ResourceDescriptor,
}

impl DescriptorBuilder {
    /// Declare the fields eligible for output, in output order
    pub fn exposable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor
            .exposable_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn sortable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor
            .sortable_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn filterable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor
            .filterable_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Declare a to-one relation
    pub fn has_one(mut self, name: impl Into<String>, target_type: impl Into<String>) -> Self {
        self.descriptor.relations.insert(
            name.into(),
            Relation {
                target_type: target_type.into(),
                cardinality: Cardinality::One,
            },
        );
        self
    }

    /// Declare a to-many relation
    pub fn has_many(mut self, name: impl Into<String>, target_type: impl Into<String>) -> Self {
        self.descriptor.relations.insert(
            name.into(),
            Relation {
                target_type: target_type.into(),
                cardinality: Cardinality::Many,
            },
        );
        self
    }

    /// Declare a computed accessor overriding the record attribute
    pub fn computed<F>(mut self, field: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&Record) -> FieldValue + Send + Sync + 'static,
    {
        self.descriptor
            .computed_fields
            .insert(field.into(), Arc::new(accessor));
        self
    }

    pub fn build(self) -> ResourceDescriptor {
        self.descriptor
    }
}

/// Registry mapping resource-type tags to their descriptors
///
/// Built once at startup, then shared read-only by every request.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: HashMap<String, Arc<ResourceDescriptor>>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its resource-type tag
    pub fn register(&mut self, descriptor: ResourceDescriptor) {
        self.descriptors
            .insert(descriptor.resource_type().to_string(), Arc::new(descriptor));
    }

    pub fn get(&self, resource_type: &str) -> Option<Arc<ResourceDescriptor>> {
        self.descriptors.get(resource_type).cloned()
    }

    pub fn resource_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_descriptor() -> ResourceDescriptor {
        ResourceDescriptor::builder("book")
            .exposable(["id", "title", "author_id"])
            .sortable(["id", "title"])
            .filterable(["title"])
            .has_one("author", "author")
            .has_many("reviews", "review")
            .build()
    }

    #[test]
    fn test_builder_preserves_field_order() {
        let descriptor = book_descriptor();
        let fields: Vec<&str> = descriptor
            .exposable_fields()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(fields, vec!["id", "title", "author_id"]);
        assert_eq!(descriptor.exposable_list(), "id,title,author_id");
    }

    #[test]
    fn test_relations() {
        let descriptor = book_descriptor();
        let author = descriptor.relation("author").unwrap();
        assert_eq!(author.target_type, "author");
        assert!(!author.is_collection());

        let reviews = descriptor.relation("reviews").unwrap();
        assert!(reviews.is_collection());

        assert_eq!(descriptor.relation_list(), "author,reviews");
        assert!(descriptor.relation("publisher").is_none());
    }

    #[test]
    fn test_computed_accessor() {
        let descriptor = ResourceDescriptor::builder("book")
            .exposable(["id", "title"])
            .computed("title", |_| FieldValue::from("Overridden!"))
            .build();

        let record = Record::new("book").with("id", 1).with("title", "Original");
        let accessor = descriptor.computed("title").unwrap();
        assert_eq!(accessor(&record), FieldValue::from("Overridden!"));
        assert!(descriptor.computed("id").is_none());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = DescriptorRegistry::new();
        registry.register(book_descriptor());

        let found = registry.get("book").unwrap();
        assert_eq!(found.resource_type(), "book");
        assert!(registry.get("publisher").is_none());
        assert_eq!(registry.resource_types(), vec!["book"]);
    }

    #[test]
    fn test_register_duplicate_replaces() {
        let mut registry = DescriptorRegistry::new();
        registry.register(book_descriptor());
        registry.register(ResourceDescriptor::builder("book").exposable(["id"]).build());
        assert_eq!(registry.resource_types().len(), 1);
        assert_eq!(registry.get("book").unwrap().exposable_list(), "id");
    }

    #[test]
    fn test_cardinality_serde() {
        assert_eq!(serde_yaml::to_string(&Cardinality::One).unwrap().trim(), "one");
        let many: Cardinality = serde_yaml::from_str("many").unwrap();
        assert_eq!(many, Cardinality::Many);
    }
}

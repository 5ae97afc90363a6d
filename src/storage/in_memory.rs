//! In-memory implementation of DataSource for testing and development

use crate::core::descriptor::Relation;
use crate::core::record::Record;
use crate::core::scope::{Constraints, DataSource, SortDirection};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory data source
///
/// Useful for testing and development. Interprets a [`Constraints`] value
/// the way a query builder compiles one statement: filters, then ordering,
/// then the slice — independent of the order the pipeline added them in.
/// Uses RwLock for thread-safe access.
///
/// Relations are keyed by integer parent id: a parent without an integer
/// `id` attribute has no related records here, though related records
/// themselves may carry ids of any type.
#[derive(Default)]
pub struct InMemoryDataSource {
    records: RwLock<Vec<Record>>,
    relations: RwLock<HashMap<(i64, String), Vec<Record>>>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, kept in insertion order
    pub fn insert(&self, record: Record) {
        self.records
            .write()
            .expect("record store lock poisoned")
            .push(record);
    }

    /// Register a related record under `(parent id, relation name)`
    pub fn relate(&self, parent_id: i64, relation: impl Into<String>, record: Record) {
        self.relations
            .write()
            .expect("relation store lock poisoned")
            .entry((parent_id, relation.into()))
            .or_default()
            .push(record);
    }

    fn filtered(&self, constraints: &Constraints) -> Result<Vec<Record>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records
            .iter()
            .filter(|record| constraints.filters.iter().all(|c| c.matches(record)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn count(&self, constraints: &Constraints) -> Result<u64> {
        Ok(self.filtered(constraints)?.len() as u64)
    }

    async fn fetch(&self, constraints: &Constraints) -> Result<Vec<Record>> {
        let mut records = self.filtered(constraints)?;

        if let Some((column, direction)) = &constraints.order {
            // Stable sort: ties keep insertion order
            records.sort_by(|a, b| {
                let ordering = match (a.get(column), b.get(column)) {
                    (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                };
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(slice) = constraints.slice {
            records = records
                .into_iter()
                .skip(slice.offset as usize)
                .take(slice.limit as usize)
                .collect();
        }

        if !constraints.preload.is_empty() {
            let relations = self
                .relations
                .read()
                .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
            for record in &mut records {
                let Some(id) = record.id() else { continue };
                for name in &constraints.preload {
                    let related = relations
                        .get(&(id, name.clone()))
                        .cloned()
                        .unwrap_or_default();
                    record.attach_preloaded(name.clone(), related);
                }
            }
        }

        Ok(records)
    }

    async fn related(
        &self,
        record: &Record,
        relation_name: &str,
        relation: &Relation,
    ) -> Result<Vec<Record>> {
        let Some(id) = record.id() else {
            return Ok(Vec::new());
        };

        let relations = self
            .relations
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut related = relations
            .get(&(id, relation_name.to_string()))
            .cloned()
            .unwrap_or_default();
        if !relation.is_collection() {
            related.truncate(1);
        }
        Ok(related)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::Cardinality;
    use crate::core::scope::{FilterCondition, Predicate, Slice};

    fn seeded() -> InMemoryDataSource {
        let source = InMemoryDataSource::new();
        source.insert(Record::new("book").with("id", 1).with("title", "Ruby under a microscope"));
        source.insert(Record::new("book").with("id", 2).with("title", "Agile Web Development"));
        source.insert(Record::new("book").with("id", 3).with("title", "Ruby on Rails Tutorial"));
        source
    }

    fn title_filter(predicate: Predicate, value: &str) -> FilterCondition {
        FilterCondition {
            field: "title".to_string(),
            predicate,
            value: value.to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_unconstrained_keeps_insertion_order() {
        let source = seeded();
        let records = source.fetch(&Constraints::default()).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_count_honors_filters_and_ignores_slice() {
        let source = seeded();
        let constraints = Constraints {
            filters: vec![title_filter(Predicate::Cont, "Ruby")],
            slice: Some(Slice { offset: 0, limit: 1 }),
            ..Default::default()
        };
        assert_eq!(source.count(&constraints).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_applies_filter_then_order_then_slice() {
        let source = seeded();
        let constraints = Constraints {
            filters: vec![title_filter(Predicate::Cont, "Ruby")],
            order: Some(("title".to_string(), SortDirection::Desc)),
            slice: Some(Slice { offset: 0, limit: 1 }),
            ..Default::default()
        };
        let records = source.fetch(&constraints).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].get("title").unwrap().as_string(),
            Some("Ruby under a microscope")
        );
    }

    #[tokio::test]
    async fn test_slice_beyond_end_is_empty() {
        let source = seeded();
        let constraints = Constraints {
            slice: Some(Slice { offset: 6, limit: 2 }),
            ..Default::default()
        };
        assert!(source.fetch(&constraints).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preload_attaches_related_records() {
        let source = seeded();
        source.relate(1, "author", Record::new("author").with("id", 9).with("name", "Pat"));

        let constraints = Constraints {
            preload: vec!["author".to_string()],
            ..Default::default()
        };
        let records = source.fetch(&constraints).await.unwrap();

        let preloaded = records[0].preloaded("author").unwrap();
        assert_eq!(preloaded.len(), 1);
        assert_eq!(preloaded[0].id(), Some(9));
        // Declared but empty relations still get an entry
        assert_eq!(records[1].preloaded("author").unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_related_to_one_truncates() {
        let source = seeded();
        source.relate(1, "author", Record::new("author").with("id", 9));
        source.relate(1, "author", Record::new("author").with("id", 10));

        let relation = Relation {
            target_type: "author".to_string(),
            cardinality: Cardinality::One,
        };
        let record = Record::new("book").with("id", 1);
        let related = source.related(&record, "author", &relation).await.unwrap();
        assert_eq!(related.len(), 1);
    }

    #[tokio::test]
    async fn test_related_missing_is_empty() {
        let source = seeded();
        let relation = Relation {
            target_type: "author".to_string(),
            cardinality: Cardinality::Many,
        };
        let record = Record::new("book").with("id", 2);
        let related = source.related(&record, "author", &relation).await.unwrap();
        assert!(related.is_empty());
    }
}

//! Lazily-evaluated, copy-on-constrain collection scope
//!
//! A [`Scope`] is the pipeline's Collection: an unevaluated view over a
//! data source plus a [`Constraints`] value object. Stages never mutate a
//! scope they were handed; each constraint application returns a new scope,
//! so no locking is needed and an aborted pipeline costs nothing. Nothing
//! touches the data source until [`Scope::count`] or [`Scope::load`].

use crate::core::descriptor::{Relation, ResourceDescriptor};
use crate::core::field::FieldValue;
use crate::core::record::Record;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Ordering direction for the sort constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// The fixed set of filter predicates
///
/// Textual predicates (`eq`, `cont`, `notcont`, `start`, `end`) compare on
/// the string rendering of the attribute. `gt`/`lt` compare numerically when
/// both sides parse as numbers, falling back to string ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Eq,
    Cont,
    Notcont,
    Start,
    End,
    Gt,
    Lt,
}

impl Predicate {
    pub const ALL: [Predicate; 7] = [
        Predicate::Eq,
        Predicate::Cont,
        Predicate::Notcont,
        Predicate::Start,
        Predicate::End,
        Predicate::Gt,
        Predicate::Lt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Predicate::Eq => "eq",
            Predicate::Cont => "cont",
            Predicate::Notcont => "notcont",
            Predicate::Start => "start",
            Predicate::End => "end",
            Predicate::Gt => "gt",
            Predicate::Lt => "lt",
        }
    }

    /// Comma-joined predicate names, used in error messages
    pub fn list() -> String {
        Self::ALL
            .iter()
            .map(Predicate::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Evaluate the predicate against an attribute value
    pub fn matches(&self, actual: Option<&FieldValue>, expected: &str) -> bool {
        let rendered = actual.map(FieldValue::render).unwrap_or_default();
        match self {
            Predicate::Eq => rendered == expected,
            Predicate::Cont => rendered.contains(expected),
            Predicate::Notcont => !rendered.contains(expected),
            Predicate::Start => rendered.starts_with(expected),
            Predicate::End => rendered.ends_with(expected),
            Predicate::Gt => compare_ordered(&rendered, expected) == std::cmp::Ordering::Greater,
            Predicate::Lt => compare_ordered(&rendered, expected) == std::cmp::Ordering::Less,
        }
    }
}

fn compare_ordered(actual: &str, expected: &str) -> std::cmp::Ordering {
    match (actual.parse::<f64>(), expected.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal),
        _ => actual.cmp(expected),
    }
}

impl FromStr for Predicate {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or(())
    }
}

/// One validated filter constraint, AND-composed with its siblings
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub field: String,
    pub predicate: Predicate,
    pub value: String,
}

impl FilterCondition {
    /// Whether a record satisfies this condition
    pub fn matches(&self, record: &Record) -> bool {
        self.predicate.matches(record.get(&self.field), &self.value)
    }
}

/// Offset/limit slice produced by the paginate stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub offset: u64,
    pub limit: u64,
}

/// The accumulated, immutable constraint set of a scope
///
/// Monotonic by construction: stages only narrow or reorder, never widen.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub order: Option<(String, SortDirection)>,
    pub filters: Vec<FilterCondition>,
    pub slice: Option<Slice>,
    pub preload: Vec<String>,
}

/// The collection capability consumed from an external data source
///
/// Implementations interpret a [`Constraints`] value the way a query builder
/// compiles one SQL statement: filters apply before ordering, ordering before
/// the slice, regardless of the order the pipeline added them in. `count`
/// ignores the slice.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Count the records satisfying the filter constraints
    async fn count(&self, constraints: &Constraints) -> Result<u64>;

    /// Materialize the records satisfying all constraints
    ///
    /// When `constraints.preload` is non-empty, related records for those
    /// relations must be attached to each returned record.
    async fn fetch(&self, constraints: &Constraints) -> Result<Vec<Record>>;

    /// Fetch the records related to one parent record
    ///
    /// Fallback path used when a relation was not preloaded.
    async fn related(
        &self,
        record: &Record,
        relation_name: &str,
        relation: &Relation,
    ) -> Result<Vec<Record>>;
}

/// A lazily-evaluated collection of records plus its descriptor
#[derive(Clone)]
pub struct Scope {
    source: Arc<dyn DataSource>,
    descriptor: Arc<ResourceDescriptor>,
    constraints: Constraints,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("resource_type", &self.descriptor.resource_type())
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}

impl Scope {
    pub fn new(source: Arc<dyn DataSource>, descriptor: Arc<ResourceDescriptor>) -> Self {
        Self {
            source,
            descriptor,
            constraints: Constraints::default(),
        }
    }

    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.descriptor
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Return a scope ordered by `column` in `direction`
    pub fn order(&self, column: &str, direction: SortDirection) -> Scope {
        let mut next = self.clone();
        next.constraints.order = Some((column.to_string(), direction));
        next
    }

    /// Return a scope with one more filter condition ANDed in
    pub fn filter(&self, condition: FilterCondition) -> Scope {
        let mut next = self.clone();
        next.constraints.filters.push(condition);
        next
    }

    /// Return a scope sliced to one page
    ///
    /// `page` is 1-based; page 0 is treated as page 1.
    pub fn slice(&self, page: u64, per: u64) -> Scope {
        let mut next = self.clone();
        next.constraints.slice = Some(Slice {
            offset: page.saturating_sub(1).saturating_mul(per),
            limit: per,
        });
        next
    }

    /// Return a scope with relations declared for preloading
    pub fn preload(&self, relations: Vec<String>) -> Scope {
        let mut next = self.clone();
        for relation in relations {
            if !next.constraints.preload.contains(&relation) {
                next.constraints.preload.push(relation);
            }
        }
        next
    }

    /// Count the records matching the filter constraints (slice ignored)
    pub async fn count(&self) -> Result<u64> {
        self.source.count(&self.constraints).await
    }

    /// Materialize the scope
    pub async fn load(&self) -> Result<Vec<Record>> {
        self.source.fetch(&self.constraints).await
    }
}

//! # Faceted
//!
//! A declarative REST query pipeline for collection endpoints: given an
//! arbitrary resource collection and a set of untrusted request parameters,
//! it applies pagination, sorting, filtering, eager-loading and output
//! field/relation selection — in a fixed order, with uniform error
//! reporting — and produces a serialized representation.
//!
//! ## Features
//!
//! - **Whitelist-Driven**: every sortable/filterable/exposable field and
//!   every relation is validated against an immutable per-type descriptor
//! - **Copy-on-Constrain Scopes**: stages compose constraints over a lazy
//!   collection without materializing or mutating it
//! - **Deterministic Links**: RFC 5988 `Link` pagination headers with
//!   `first`/`prev`/`next`/`last` relations
//! - **Precise Errors**: every validation failure carries the exact
//!   offending `key=value`, surfaced as HTTP 400
//! - **Sparse Fieldsets & Embedding**: `fields=` subsets and `embed=`
//!   relation trees, with preloading to avoid N+1 lookups
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use faceted::prelude::*;
//!
//! let mut registry = DescriptorRegistry::new();
//! registry.register(
//!     ResourceDescriptor::builder("book")
//!         .exposable(["id", "title", "author_id"])
//!         .sortable(["id", "title"])
//!         .filterable(["title"])
//!         .has_one("author", "author")
//!         .build(),
//! );
//!
//! // Per request:
//! let params = RequestParams::from_pairs(query_pairs);
//! let mut context = RequestContext::new(base_url, path);
//! let scope = Scope::new(source.clone(), registry.get("book").unwrap());
//!
//! let scope = QueryOrchestrator::new(scope, &params, &mut context).run().await?;
//! let nodes = Serializer::new(registry, source).build_scope(&scope, &params).await?;
//! ```

pub mod config;
pub mod core;
pub mod present;
pub mod query;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Cardinality, Constraints, DataSource, DescriptorRegistry, FieldValue, FilterCondition,
        PipelineError, Predicate, QueryBuilderError, Record, Relation, RepresentationBuilderError,
        RequestContext, RequestParams, ResourceDescriptor, Scope, SortDirection,
    };

    // === Query builders ===
    pub use crate::query::{
        EagerLoader, Filter, Paginator, QueryAction, QueryOrchestrator, Sorter, ACTIONS,
    };

    // === Representation builders ===
    pub use crate::present::{EmbedPicker, FieldPicker, Node, Presenter, Serializer};

    // === Config ===
    pub use crate::config::{RelationConfig, ResourceConfig, ResourcesConfig};

    // === Storage ===
    pub use crate::storage::InMemoryDataSource;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
}

//! Core types of the query pipeline: field values, records, descriptors,
//! scopes, request parameters and errors

pub mod context;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod params;
pub mod record;
pub mod scope;

pub use context::RequestContext;
pub use descriptor::{
    Cardinality, ComputedField, DescriptorBuilder, DescriptorRegistry, Relation,
    ResourceDescriptor,
};
pub use error::{PipelineError, QueryBuilderError, RepresentationBuilderError};
pub use field::FieldValue;
pub use params::RequestParams;
pub use record::Record;
pub use scope::{Constraints, DataSource, FilterCondition, Predicate, Scope, Slice, SortDirection};

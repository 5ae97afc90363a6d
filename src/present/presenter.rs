//! Presentation wrapper assembled by the field and embed pickers

use crate::core::descriptor::ResourceDescriptor;
use crate::core::params::RequestParams;
use crate::core::record::Record;
use serde_json::Value;
use std::sync::Arc;

/// A Presentation Node: ordered field name → JSON value mapping
///
/// `serde_json` is built with `preserve_order`, so insertion order survives
/// serialization and nesting.
pub type Node = serde_json::Map<String, Value>;

/// Wraps one record with the request parameters and its descriptor while
/// the pickers incrementally fill `data`
///
/// Created per record per request and discarded after serialization.
pub struct Presenter<'a> {
    record: Record,
    params: &'a RequestParams,
    descriptor: Arc<ResourceDescriptor>,
    pub data: Node,
}

impl<'a> Presenter<'a> {
    pub fn new(
        record: Record,
        params: &'a RequestParams,
        descriptor: Arc<ResourceDescriptor>,
    ) -> Self {
        Self {
            record,
            params,
            descriptor,
            data: Node::new(),
        }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn params(&self) -> &RequestParams {
        self.params
    }

    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.descriptor
    }

    /// Consume the presenter, yielding the built node
    pub fn into_data(self) -> Node {
        self.data
    }
}

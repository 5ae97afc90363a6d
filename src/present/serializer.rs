//! Serializer: field selection plus embedding over records and collections

use crate::core::descriptor::DescriptorRegistry;
use crate::core::error::PipelineError;
use crate::core::params::RequestParams;
use crate::core::record::Record;
use crate::core::scope::{DataSource, Scope};
use crate::present::embed_picker::EmbedPicker;
use crate::present::field_picker::FieldPicker;
use crate::present::presenter::{Node, Presenter};
use anyhow::anyhow;
use std::sync::Arc;

/// Builds presentation trees for single records or whole collections
///
/// Runs field selection then embedding for each record, resolving
/// descriptors through the registry so embedded relations present
/// themselves with their own whitelists.
pub struct Serializer {
    registry: Arc<DescriptorRegistry>,
    source: Arc<dyn DataSource>,
}

impl Serializer {
    pub fn new(registry: Arc<DescriptorRegistry>, source: Arc<dyn DataSource>) -> Self {
        Self { registry, source }
    }

    /// Build the presentation node for one record
    pub async fn build_record(
        &self,
        record: Record,
        params: &RequestParams,
    ) -> Result<Node, PipelineError> {
        let descriptor = self.registry.get(record.resource_type()).ok_or_else(|| {
            anyhow!(
                "no descriptor registered for resource type '{}'",
                record.resource_type()
            )
        })?;

        let mut presenter = Presenter::new(record, params, descriptor);
        FieldPicker::new(&mut presenter).pick()?;
        EmbedPicker::new(&mut presenter, &self.registry, &self.source)
            .embed()
            .await?;
        Ok(presenter.into_data())
    }

    /// Build presentation nodes for a collection of records
    pub async fn build_collection(
        &self,
        records: Vec<Record>,
        params: &RequestParams,
    ) -> Result<Vec<Node>, PipelineError> {
        let mut nodes = Vec::with_capacity(records.len());
        for record in records {
            nodes.push(self.build_record(record, params).await?);
        }
        Ok(nodes)
    }

    /// Materialize a scope and build its presentation nodes
    pub async fn build_scope(
        &self,
        scope: &Scope,
        params: &RequestParams,
    ) -> Result<Vec<Node>, PipelineError> {
        let records = scope.load().await?;
        self.build_collection(records, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::ResourceDescriptor;
    use crate::storage::InMemoryDataSource;
    use serde_json::json;

    fn serializer(source: InMemoryDataSource) -> Serializer {
        let mut registry = DescriptorRegistry::new();
        registry.register(
            ResourceDescriptor::builder("book")
                .exposable(["id", "title"])
                .has_one("author", "author")
                .build(),
        );
        registry.register(
            ResourceDescriptor::builder("author")
                .exposable(["id", "name"])
                .build(),
        );
        Serializer::new(Arc::new(registry), Arc::new(source))
    }

    #[tokio::test]
    async fn test_build_record_with_embed() {
        let source = InMemoryDataSource::new();
        source.relate(1, "author", Record::new("author").with("id", 4).with("name", "Avdi"));
        let serializer = serializer(source);

        let record = Record::new("book").with("id", 1).with("title", "Confident Ruby");
        let params = RequestParams::new().with("embed", "author");
        let node = serializer.build_record(record, &params).await.unwrap();

        assert_eq!(
            serde_json::Value::Object(node),
            json!({
                "id": 1,
                "title": "Confident Ruby",
                "author": {"id": 4, "name": "Avdi"}
            })
        );
    }

    #[tokio::test]
    async fn test_build_collection_preserves_record_order() {
        let serializer = serializer(InMemoryDataSource::new());
        let records = vec![
            Record::new("book").with("id", 2).with("title", "B"),
            Record::new("book").with("id", 1).with("title", "A"),
        ];
        let params = RequestParams::new();
        let nodes = serializer.build_collection(records, &params).await.unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["id"], json!(2));
        assert_eq!(nodes[1]["id"], json!(1));
    }

    #[tokio::test]
    async fn test_unregistered_type_is_a_source_error() {
        let serializer = serializer(InMemoryDataSource::new());
        let record = Record::new("publisher").with("id", 1);
        let params = RequestParams::new();
        let err = serializer.build_record(record, &params).await.unwrap_err();

        assert!(matches!(err, PipelineError::Source(_)));
        assert!(err.to_string().contains("publisher"));
    }

    #[tokio::test]
    async fn test_field_error_propagates() {
        let serializer = serializer(InMemoryDataSource::new());
        let record = Record::new("book").with("id", 1).with("title", "x");
        let params = RequestParams::new().with("fields", "isbn");
        let err = serializer.build_record(record, &params).await.unwrap_err();

        assert_eq!(err.invalid_params(), Some("fields=isbn"));
    }
}

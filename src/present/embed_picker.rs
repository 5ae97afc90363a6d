//! Relation embedding into the presentation node

use crate::core::descriptor::{DescriptorRegistry, Relation, ResourceDescriptor};
use crate::core::error::{PipelineError, RepresentationBuilderError};
use crate::core::params::RequestParams;
use crate::core::record::Record;
use crate::core::scope::DataSource;
use crate::present::field_picker::FieldPicker;
use crate::present::presenter::{Node, Presenter};
use anyhow::anyhow;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// Adds requested relations to a presenter's data
///
/// Each name in the `embed` parameter is validated against the descriptor's
/// declared relations. A to-one relation becomes a single nested node built
/// through the target descriptor's own field selection; a to-many relation
/// becomes an array of nested nodes ordered by identifier ascending. A null
/// to-one relation adds no key. Nested nodes carry the target's full
/// exposable field set — the request's `fields`/`embed` do not recurse.
///
/// Records preloaded by the eager-load stage are used as-is; only relations
/// that were not preloaded fall back to a data-source lookup.
pub struct EmbedPicker<'a, 'p> {
    presenter: &'a mut Presenter<'p>,
    registry: &'a DescriptorRegistry,
    source: &'a Arc<dyn DataSource>,
}

impl<'a, 'p> EmbedPicker<'a, 'p> {
    pub fn new(
        presenter: &'a mut Presenter<'p>,
        registry: &'a DescriptorRegistry,
        source: &'a Arc<dyn DataSource>,
    ) -> Self {
        Self {
            presenter,
            registry,
            source,
        }
    }

    pub async fn embed(self) -> Result<(), PipelineError> {
        let embeds = self.validate_embeds()?;
        let descriptor = self.presenter.descriptor().clone();

        for name in embeds {
            // Membership validated above
            let Some(relation) = descriptor.relation(&name).cloned() else {
                continue;
            };
            let related = self.fetch_related(&name, &relation).await?;
            let target = self.registry.get(&relation.target_type).ok_or_else(|| {
                anyhow!(
                    "no descriptor registered for resource type '{}'",
                    relation.target_type
                )
            })?;

            if relation.is_collection() {
                let mut records = related;
                // Identifier order over the raw attribute, so Uuid and
                // string ids sort too; records without an id go last
                records.sort_by(|a, b| match (a.get("id"), b.get("id")) {
                    (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                });
                let nodes = records
                    .into_iter()
                    .map(|record| build_node(record, &target).map(Value::Object))
                    .collect::<Result<Vec<_>, _>>()?;
                self.presenter.data.insert(name, Value::Array(nodes));
            } else if let Some(record) = related.into_iter().next() {
                let node = build_node(record, &target)?;
                self.presenter.data.insert(name, Value::Object(node));
            }
        }
        Ok(())
    }

    async fn fetch_related(
        &self,
        name: &str,
        relation: &Relation,
    ) -> Result<Vec<Record>, PipelineError> {
        if let Some(preloaded) = self.presenter.record().preloaded(name) {
            return Ok(preloaded.to_vec());
        }
        let related = self
            .source
            .related(self.presenter.record(), name, relation)
            .await?;
        Ok(related)
    }

    fn validate_embeds(&self) -> Result<Vec<String>, RepresentationBuilderError> {
        let descriptor = self.presenter.descriptor();
        let Some(raw) = self.presenter.params().embed() else {
            return Ok(Vec::new());
        };

        let mut embeds = Vec::new();
        for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if descriptor.relation(name).is_none() {
                return Err(RepresentationBuilderError::new(
                    format!("embed={name}"),
                    format!(
                        "Invalid Embed. Allowed relations: ({})",
                        descriptor.relation_list()
                    ),
                ));
            }
            if !embeds.iter().any(|e| e == name) {
                embeds.push(name.to_string());
            }
        }
        Ok(embeds)
    }
}

fn build_node(
    record: Record,
    descriptor: &Arc<ResourceDescriptor>,
) -> Result<Node, RepresentationBuilderError> {
    let params = RequestParams::new();
    let mut nested = Presenter::new(record, &params, descriptor.clone());
    FieldPicker::new(&mut nested).pick()?;
    Ok(nested.into_data())
}

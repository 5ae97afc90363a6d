//! Descriptor configuration loading
//!
//! Resource descriptors can be declared in YAML and compiled into the
//! immutable [`DescriptorRegistry`] at process start. Computed field
//! accessors are code, not configuration; register them by building the
//! descriptor in code instead, or extend a loaded registry afterwards.

use crate::core::descriptor::{Cardinality, DescriptorRegistry, ResourceDescriptor};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration for one relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationConfig {
    /// Relation name as requested via `embed`/`include`
    pub name: String,

    /// Resource-type tag of the target
    pub target: String,

    pub cardinality: Cardinality,
}

/// Configuration for one resource type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource-type tag (e.g. "book")
    pub name: String,

    /// Fields eligible for output, in output order
    pub exposable: Vec<String>,

    #[serde(default)]
    pub sortable: Vec<String>,

    #[serde(default)]
    pub filterable: Vec<String>,

    #[serde(default)]
    pub relations: Vec<RelationConfig>,
}

/// Complete descriptor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    pub resources: Vec<ResourceConfig>,
}

impl ResourcesConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Compile the configuration into a descriptor registry
    pub fn build_registry(&self) -> DescriptorRegistry {
        let mut registry = DescriptorRegistry::new();
        for resource in &self.resources {
            let mut builder = ResourceDescriptor::builder(&resource.name)
                .exposable(resource.exposable.iter().cloned())
                .sortable(resource.sortable.iter().cloned())
                .filterable(resource.filterable.iter().cloned());
            for relation in &resource.relations {
                builder = match relation.cardinality {
                    Cardinality::One => builder.has_one(&relation.name, &relation.target),
                    Cardinality::Many => builder.has_many(&relation.name, &relation.target),
                };
            }
            registry.register(builder.build());
        }
        registry
    }
}

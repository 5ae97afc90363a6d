//! Filter stage: whitelist-checked `field_predicate` expressions

use crate::core::descriptor::ResourceDescriptor;
use crate::core::error::QueryBuilderError;
use crate::core::params::RequestParams;
use crate::core::scope::{FilterCondition, Predicate, Scope};

/// Translates the nested filter-expression group into filter constraints
///
/// Each entry is shaped `field_predicate=value`. The field must be in the
/// descriptor's filterable whitelist and the predicate one of the fixed set;
/// all entries are AND-composed onto the scope. Any unknown field or
/// predicate fails citing the full original `key=value`.
pub struct Filter<'a> {
    scope: Scope,
    params: &'a RequestParams,
}

impl<'a> Filter<'a> {
    pub fn new(scope: Scope, params: &'a RequestParams) -> Self {
        Self { scope, params }
    }

    pub fn filter(self) -> Result<Scope, QueryBuilderError> {
        let mut scope = self.scope;
        for (key, value) in self.params.filters() {
            let condition = parse_condition(scope.descriptor(), key, value)?;
            scope = scope.filter(condition);
        }
        Ok(scope)
    }
}

/// Split `field_predicate` against the filterable whitelist
///
/// Field names may themselves contain underscores, so the key is matched by
/// trying each whitelisted field as a prefix and requiring the remainder to
/// be a known predicate.
fn parse_condition(
    descriptor: &ResourceDescriptor,
    key: &str,
    value: &str,
) -> Result<FilterCondition, QueryBuilderError> {
    for field in descriptor.filterable_fields() {
        let Some(rest) = key
            .strip_prefix(field.as_str())
            .and_then(|r| r.strip_prefix('_'))
        else {
            continue;
        };
        if let Ok(predicate) = rest.parse::<Predicate>() {
            return Ok(FilterCondition {
                field: field.clone(),
                predicate,
                value: value.to_string(),
            });
        }
    }

    Err(QueryBuilderError::new(
        format!("{key}={value}"),
        format!(
            "Invalid Filter params. Allowed filters: ({}), predicates: ({})",
            descriptor.filterable_list(),
            Predicate::list()
        ),
    ))
}

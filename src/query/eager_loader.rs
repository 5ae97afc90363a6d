//! Eager-load stage: relation preloading from `include`/`embed` params

use crate::core::error::QueryBuilderError;
use crate::core::params::RequestParams;
use crate::core::scope::Scope;

/// Declares which relations to preload before the scope is iterated
///
/// Both `include` and `embed` are honored (comma-separated), merged and
/// deduplicated, so embedding never triggers per-record lookups for
/// relations the client announced. Every name is validated against the
/// descriptor's declared relations.
pub struct EagerLoader<'a> {
    scope: Scope,
    params: &'a RequestParams,
}

impl<'a> EagerLoader<'a> {
    pub fn new(scope: Scope, params: &'a RequestParams) -> Self {
        Self { scope, params }
    }

    pub fn load(self) -> Result<Scope, QueryBuilderError> {
        let mut relations: Vec<String> = Vec::new();

        for (param, raw) in [
            ("include", self.params.include()),
            ("embed", self.params.embed()),
        ] {
            let Some(raw) = raw else { continue };
            for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                if self.scope.descriptor().relation(name).is_none() {
                    return Err(QueryBuilderError::new(
                        format!("{param}={name}"),
                        format!(
                            "Invalid Eager Load. Allowed relations: ({})",
                            self.scope.descriptor().relation_list()
                        ),
                    ));
                }
                if !relations.iter().any(|r| r == name) {
                    relations.push(name.to_string());
                }
            }
        }

        if relations.is_empty() {
            Ok(self.scope)
        } else {
            Ok(self.scope.preload(relations))
        }
    }
}

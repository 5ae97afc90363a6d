//! Sort stage: whitelist-checked column and direction ordering

use crate::core::error::QueryBuilderError;
use crate::core::params::RequestParams;
use crate::core::scope::{Scope, SortDirection};

pub const DIRECTIONS: [&str; 2] = ["asc", "desc"];

/// Translates `sort`/`dir` parameters into an ordering constraint
///
/// `sort` is optional (absent means no-op); `dir` defaults to `asc`. The
/// column is validated against the descriptor's sortable fields, the
/// direction against `asc`/`desc`. Ties are broken by underlying storage
/// order.
pub struct Sorter<'a> {
    scope: Scope,
    params: &'a RequestParams,
}

impl<'a> Sorter<'a> {
    pub fn new(scope: Scope, params: &'a RequestParams) -> Self {
        Self { scope, params }
    }

    pub fn sort(self) -> Result<Scope, QueryBuilderError> {
        let Some(column) = self.params.sort() else {
            return Ok(self.scope);
        };
        let direction = self.params.dir().unwrap_or("asc");

        if !self.scope.descriptor().sortable_fields().contains(column) {
            return Err(self.error("sort", column));
        }
        if !DIRECTIONS.contains(&direction) {
            return Err(self.error("dir", direction));
        }

        // Both validated above
        let direction: SortDirection = direction.parse().unwrap_or(SortDirection::Asc);
        Ok(self.scope.order(column, direction))
    }

    fn error(&self, name: &str, value: &str) -> QueryBuilderError {
        let columns = self.scope.descriptor().sortable_list();
        QueryBuilderError::new(
            format!("{name}={value}"),
            format!(
                "Invalid sorting params. sort: ({columns}), dir: {}",
                DIRECTIONS.join(",")
            ),
        )
    }
}

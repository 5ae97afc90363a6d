//! Query orchestrator: fixed-order composition of the pipeline stages

use crate::core::context::RequestContext;
use crate::core::error::PipelineError;
use crate::core::params::RequestParams;
use crate::core::scope::Scope;
use crate::query::eager_loader::EagerLoader;
use crate::query::filter::Filter;
use crate::query::paginator::Paginator;
use crate::query::sorter::Sorter;
use std::str::FromStr;

/// One pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryAction {
    Paginate,
    Sort,
    Filter,
    EagerLoad,
}

impl QueryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryAction::Paginate => "paginate",
            QueryAction::Sort => "sort",
            QueryAction::Filter => "filter",
            QueryAction::EagerLoad => "eager_load",
        }
    }
}

impl FromStr for QueryAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paginate" => Ok(QueryAction::Paginate),
            "sort" => Ok(QueryAction::Sort),
            "filter" => Ok(QueryAction::Filter),
            "eager_load" => Ok(QueryAction::EagerLoad),
            _ => Err(()),
        }
    }
}

/// The canonical stage order. Pagination runs before filtering; constraints
/// compose into a single evaluation, so row output is unaffected, but
/// pagination links count the pre-filter collection. Inherited behavior,
/// kept for parity.
pub const ACTIONS: [QueryAction; 4] = [
    QueryAction::Paginate,
    QueryAction::Sort,
    QueryAction::Filter,
    QueryAction::EagerLoad,
];

/// Runs the requested stages over a scope, fail-fast
///
/// Each stage validates its own parameters and returns a further constrained
/// scope; the first failure aborts the remaining stages with no partial
/// application. The paginate stage additionally writes the `Link` header
/// into the request context.
pub struct QueryOrchestrator<'a> {
    scope: Scope,
    params: &'a RequestParams,
    context: &'a mut RequestContext,
}

impl<'a> QueryOrchestrator<'a> {
    pub fn new(scope: Scope, params: &'a RequestParams, context: &'a mut RequestContext) -> Self {
        Self {
            scope,
            params,
            context,
        }
    }

    /// Run all four stages in canonical order
    pub async fn run(self) -> Result<Scope, PipelineError> {
        self.run_ordered(&ACTIONS).await
    }

    /// Run an ordered subset of stages named by the caller
    ///
    /// A name outside the known set fails with
    /// [`PipelineError::InvalidAction`] before any stage runs.
    pub async fn run_actions(self, names: &[&str]) -> Result<Scope, PipelineError> {
        let actions = names
            .iter()
            .map(|name| {
                QueryAction::from_str(name)
                    .map_err(|_| PipelineError::InvalidAction(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.run_ordered(&actions).await
    }

    async fn run_ordered(self, actions: &[QueryAction]) -> Result<Scope, PipelineError> {
        let mut scope = self.scope;
        for action in actions {
            tracing::debug!(action = action.as_str(), "running query action");
            scope = match action {
                QueryAction::Paginate => {
                    let paginator = Paginator::new(scope, self.params, self.context.current_url())?;
                    let links = paginator.links().await?;
                    if !links.is_empty() {
                        self.context.set_link_header(&links);
                    }
                    paginator.paginate()
                }
                QueryAction::Sort => Sorter::new(scope, self.params).sort()?,
                QueryAction::Filter => Filter::new(scope, self.params).filter()?,
                QueryAction::EagerLoad => EagerLoader::new(scope, self.params).load()?,
            };
        }
        Ok(scope)
    }
}

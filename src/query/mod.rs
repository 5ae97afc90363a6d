//! Query-builder stages and their orchestrator

pub mod eager_loader;
pub mod filter;
pub mod orchestrator;
pub mod paginator;
pub mod sorter;

pub use eager_loader::EagerLoader;
pub use filter::Filter;
pub use orchestrator::{QueryAction, QueryOrchestrator, ACTIONS};
pub use paginator::Paginator;
pub use sorter::Sorter;

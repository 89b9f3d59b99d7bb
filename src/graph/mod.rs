//! Reference graph: the single source of truth for who references whom.
//!
//! Provides the graph value, the builder that derives it from an inventory
//! and schema sources, and read-only summary queries.

pub mod builder;
pub mod engine;
pub mod query;

pub use builder::{build_graph, GraphBuilder, USAGE_EXTENSIONS};
pub use engine::{Graph, GraphStats, SchemaLink};
pub use query::{AssetSummary, ReferenceSite, ReferenceSummary, TableUsageSummary, SNIPPET_LEN};

#[cfg(test)]
pub(crate) mod testing;

//! Ports (interfaces) for external collaborators
//!
//! This core owns no wire protocol and no storage format: everything it
//! needs from the outside world comes through the traits defined here,
//! injected from a composition root as `Arc<dyn Trait>`. There is no
//! global container.
//!
//! - `providers`: retrieval backends, embeddings, caching, and the
//!   pluggable search-strategy interface
//! - `infrastructure`: query optimization, performance monitoring,
//!   result formatting, and model persistence

pub mod infrastructure;
pub mod providers;

pub use infrastructure::{
    ModelStore, MonitorStats, PerformanceMonitor, QueryOptimizer, ResultFormatter,
};
pub use providers::{
    CacheProvider, CacheStats, CandidateSource, EmbeddingProvider, GraphSearchProvider,
    SearchOpts, SearchStrategy, SemanticSearchProvider, VectorSearchProvider,
};

//! Provider Ports
//!
//! Contracts for the retrieval backends and the cache. Implementations
//! live outside this core (vector store, graph store, embedding
//! providers) or in the engine crate (built-in strategies, moka cache).
//!
//! ## Provider Pattern
//!
//! Every port is an `async_trait` with a `provider_name()`-style identity
//! where observability needs it, enabling consistent registration and
//! factory-based creation at the composition root.

use crate::entities::ScoredCandidate;
use crate::error::Result;
use crate::value_objects::{QueryFilters, SourceKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options passed to every retrieval backend call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOpts {
    /// Maximum number of hits to return
    pub limit: usize,
    /// Structured filters
    #[serde(default)]
    pub filters: QueryFilters,
    /// Project scope
    pub project_id: String,
}

/// Vector-similarity search over embedded code chunks
///
/// Out of scope to implement here; consumed through this boundary.
#[async_trait]
pub trait VectorSearchProvider: Send + Sync {
    /// Search by embedding vector. Hits arrive pre-ingested into the
    /// canonical candidate shape with raw backend scores.
    async fn search(&self, embedding: &[f32], opts: &SearchOpts) -> Result<Vec<ScoredCandidate>>;
}

/// Graph-relationship search over the code graph
#[async_trait]
pub trait GraphSearchProvider: Send + Sync {
    /// Search by query text. Hits may carry `graph_context`.
    async fn search(&self, query: &str, opts: &SearchOpts) -> Result<Vec<ScoredCandidate>>;
}

/// Text-to-vector embedding provider
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text into a vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Semantic search collaborator used by the hybrid multi-strategy path
///
/// Unlike `VectorSearchProvider` this takes query text directly; the
/// collaborator owns its own embedding step.
#[async_trait]
pub trait SemanticSearchProvider: Send + Sync {
    /// Search by query text, returning semantically ranked candidates
    async fn search(&self, query: &str, opts: &SearchOpts) -> Result<Vec<ScoredCandidate>>;
}

/// A pluggable retrieval strategy for the hybrid multi-strategy path
///
/// Keyword, fuzzy, and structural search plug in here. The engine crate
/// ships reference implementations; callers may substitute their own.
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    /// Which source kind this strategy reports its scores under
    fn source_kind(&self) -> SourceKind;

    /// Run the strategy for one query
    async fn run(&self, query: &str, opts: &SearchOpts) -> Result<Vec<ScoredCandidate>>;
}

/// Corpus access for the built-in strategies
///
/// The built-in keyword/fuzzy/structural strategies score candidates from
/// an injected corpus rather than owning an index of their own.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// All candidates for a project, unscored
    async fn candidates(&self, project_id: &str) -> Result<Vec<crate::entities::Candidate>>;
}

/// Cache operation statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of live entries
    pub entries: u64,
    /// Hit rate in [0, 1]
    pub hit_rate: f64,
}

impl CacheStats {
    /// Hit rate computed from hits and misses
    pub fn calculate_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Cache Provider Port
///
/// JSON-based storage with per-entry TTL. Cache failures are recoverable
/// by contract: callers log and bypass the cache, they never fail the
/// query on a cache error.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Get a cached JSON value, `None` on miss or expiry
    async fn get_json(&self, key: &str) -> Result<Option<String>>;

    /// Store a JSON value with a TTL
    async fn set_json(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Delete one key; true if it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Drop all entries
    async fn clear(&self) -> Result<()>;

    /// Current statistics
    async fn stats(&self) -> Result<CacheStats>;

    /// Identifier of this implementation (e.g. "moka", "null")
    fn provider_name(&self) -> &str;
}

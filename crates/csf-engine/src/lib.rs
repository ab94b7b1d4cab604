//! Scoring Engines - code-search-fusion
//!
//! The algorithmic heart of the code-search core: stateless similarity
//! primitives, the five-signal result fusion engine, the second-pass
//! reranking engine, the pluggable ML scorer with A/B evaluation, the
//! feedback-driven adaptive weight store, the built-in hybrid search
//! strategies, and the cache providers.
//!
//! Everything here is pure computation or actor-guarded state; nothing
//! performs retrieval of its own. Retrieval backends are consumed by the
//! application crate through the ports in `csf-domain`.

pub mod adaptive;
pub mod cache;
pub mod config;
pub mod fusion;
pub mod ml;
pub mod rerank;
pub mod similarity;
pub mod strategies;

// Internal tests module (can access crate internals)
#[cfg(test)]
mod tests;

pub use adaptive::AdaptiveWeightStore;
pub use cache::{CacheKeyParts, MokaCacheProvider, NullCacheProvider};
pub use config::{AdaptiveConfig, CacheConfig, FusionConfig, RerankConfig};
pub use fusion::FusionEngine;
pub use ml::{LinearScoringModel, MlScorer, ScoringModel};
pub use rerank::{RerankEngine, RerankOptions, RerankStrategy};

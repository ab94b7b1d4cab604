//! Result Fusion Engine
//!
//! Merges candidates from the vector and graph branches into one ranked
//! list: intent-aware weight rebalancing, per-source min-max score
//! normalization, merge by candidate id, contextual/recency/popularity
//! scoring, weighted final score, and confidence estimation.

mod engine;
mod intent;

pub use engine::FusionEngine;
pub use intent::{classify_intent, QueryIntent};

//! Search-explanation value objects
//!
//! A pure function of a hybrid result's stored per-strategy scores and
//! content; computed on demand and memoized by the hybrid service.

use crate::value_objects::SourceKind;
use serde::{Deserialize, Serialize};

/// One strategy's share of a hybrid result's combined score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyContribution {
    /// The strategy
    pub source: SourceKind,
    /// Its raw score for this result
    pub score: f64,
    /// Its percentage of the combined score (0..=100)
    pub contribution_pct: f64,
}

/// Human-readable breakdown of why a result ranked where it did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchExplanation {
    /// Per-strategy score and contribution
    pub strategy_breakdown: Vec<StrategyContribution>,
    /// Qualitative factors (e.g. "All keywords matched")
    pub factors: Vec<String>,
    /// Query terms found verbatim in the content, with surrounding context
    pub matched_terms: Vec<String>,
    /// Free-text suggestions for improving the query
    pub recommendations: Vec<String>,
}

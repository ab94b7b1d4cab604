//! Result value objects
//!
//! The shapes produced by the three ranking stages: fusion, hybrid
//! multi-strategy search, and reranking. Each carries its per-source
//! score breakdown alongside the final score so downstream consumers
//! (explanations, reranking, feedback) never need to re-derive them.

use crate::entities::Candidate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which retrieval source produced a score
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Semantic,
    Graph,
    Keyword,
    Fuzzy,
    Structural,
}

impl SourceKind {
    /// Stable lowercase name, used in logs and cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Graph => "graph",
            Self::Keyword => "keyword",
            Self::Fuzzy => "fuzzy",
            Self::Structural => "structural",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value Object: a candidate after five-signal fusion
///
/// Per-source scores are the min-max normalized values that entered the
/// weighted sum; a source that did not return the candidate contributes 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    /// The merged candidate
    pub candidate: Candidate,
    /// Normalized vector-search score
    pub vector_score: f64,
    /// Normalized graph-search score
    pub graph_score: f64,
    /// Query-term overlap score
    pub contextual_score: f64,
    /// Exponential-decay recency score
    pub recency_score: f64,
    /// Usage/reference popularity score
    pub popularity_score: f64,
    /// Weighted final score in [0, 1]
    pub final_score: f64,
    /// Trust in the final score, from source agreement and metadata
    pub confidence: f64,
}

/// Kind of match highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    /// A query term found verbatim in the content
    Keyword,
    /// A strong semantic match without a verbatim term
    Semantic,
}

/// One highlighted match within a hybrid result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchHighlight {
    /// Highlight kind
    pub kind: HighlightKind,
    /// The matched term (query text for semantic highlights)
    pub term: String,
    /// Surrounding content snippet, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Value Object: a candidate after four-strategy hybrid fusion
///
/// `strategy_scores` holds only the strategies that returned the
/// candidate; absent strategies contribute zero to `combined_score` and
/// weights are deliberately not renormalized per candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridResult {
    /// The candidate
    pub candidate: Candidate,
    /// Raw score per strategy that returned this candidate
    pub strategy_scores: BTreeMap<SourceKind, f64>,
    /// Weighted sum over the returning strategies
    pub combined_score: f64,
    /// Match highlights for presentation
    #[serde(default)]
    pub match_highlights: Vec<MatchHighlight>,
}

impl HybridResult {
    /// Score for one strategy, zero if it did not return this candidate
    pub fn strategy_score(&self, source: SourceKind) -> f64 {
        self.strategy_scores.get(&source).copied().unwrap_or(0.0)
    }
}

/// Value Object: a candidate after a second-pass rerank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankedResult {
    /// The candidate
    pub candidate: Candidate,
    /// Score the candidate entered the rerank with
    pub original_score: f64,
    /// Semantic term (Jaccard overlap, or ML prediction for ml strategy)
    pub semantic_score: f64,
    /// Graph term
    pub graph_score: f64,
    /// Contextual term
    pub contextual_score: f64,
    /// Weighted final score
    pub final_score: f64,
    /// Trust in the final score
    pub confidence: f64,
}

//! Fusion and strategy weight sets
//!
//! `FusionWeights` cover the five-signal coordinator path and are always
//! renormalized to sum to exactly 1 before use. `StrategyWeights` cover
//! the four-strategy hybrid path and are deliberately NOT renormalized
//! per candidate: a strategy that did not return a candidate simply
//! contributes nothing.

use crate::constants::{
    FUSION_CONTEXTUAL_WEIGHT, FUSION_GRAPH_WEIGHT, FUSION_POPULARITY_WEIGHT,
    FUSION_RECENCY_WEIGHT, FUSION_VECTOR_WEIGHT, STRATEGY_FUZZY_WEIGHT, STRATEGY_KEYWORD_WEIGHT,
    STRATEGY_SEMANTIC_WEIGHT, STRATEGY_STRUCTURAL_WEIGHT,
};
use serde::{Deserialize, Serialize};

/// Weights for the five fusion signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Vector/semantic source weight
    pub vector: f64,
    /// Graph source weight
    pub graph: f64,
    /// Query-term overlap weight
    pub contextual: f64,
    /// Recency weight
    pub recency: f64,
    /// Popularity weight
    pub popularity: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            vector: FUSION_VECTOR_WEIGHT,
            graph: FUSION_GRAPH_WEIGHT,
            contextual: FUSION_CONTEXTUAL_WEIGHT,
            recency: FUSION_RECENCY_WEIGHT,
            popularity: FUSION_POPULARITY_WEIGHT,
        }
    }
}

impl FusionWeights {
    /// Sum of all five weights
    pub fn sum(&self) -> f64 {
        self.vector + self.graph + self.contextual + self.recency + self.popularity
    }

    /// Renormalize so the weights sum to exactly 1.
    ///
    /// A degenerate all-zero set falls back to the defaults rather than
    /// dividing by zero.
    pub fn normalize(self) -> Self {
        let sum = self.sum();
        if sum <= f64::EPSILON {
            return Self::default();
        }
        Self {
            vector: self.vector / sum,
            graph: self.graph / sum,
            contextual: self.contextual / sum,
            recency: self.recency / sum,
            popularity: self.popularity / sum,
        }
    }
}

/// Weights for the four hybrid strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    /// Semantic strategy weight
    pub semantic: f64,
    /// Keyword strategy weight
    pub keyword: f64,
    /// Fuzzy strategy weight
    pub fuzzy: f64,
    /// Structural strategy weight
    pub structural: f64,
}

impl Default for StrategyWeights {
    fn default() -> Self {
        Self {
            semantic: STRATEGY_SEMANTIC_WEIGHT,
            keyword: STRATEGY_KEYWORD_WEIGHT,
            fuzzy: STRATEGY_FUZZY_WEIGHT,
            structural: STRATEGY_STRUCTURAL_WEIGHT,
        }
    }
}

impl StrategyWeights {
    /// Weight for one strategy by source kind (graph maps to zero; the
    /// hybrid path never dispatches a graph strategy)
    pub fn for_source(&self, source: crate::value_objects::SourceKind) -> f64 {
        use crate::value_objects::SourceKind;
        match source {
            SourceKind::Semantic => self.semantic,
            SourceKind::Keyword => self.keyword,
            SourceKind::Fuzzy => self.fuzzy,
            SourceKind::Structural => self.structural,
            SourceKind::Graph => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_sums_to_one() {
        let w = FusionWeights {
            vector: 0.5,
            graph: 0.6,
            contextual: 0.2,
            recency: 0.05,
            popularity: 0.05,
        }
        .normalize();
        assert!((w.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_of_zero_weights_falls_back_to_defaults() {
        let w = FusionWeights {
            vector: 0.0,
            graph: 0.0,
            contextual: 0.0,
            recency: 0.0,
            popularity: 0.0,
        }
        .normalize();
        assert_eq!(w, FusionWeights::default());
    }

    #[test]
    fn default_strategy_weights_match_documented_defaults() {
        let w = StrategyWeights::default();
        assert!((w.semantic - 0.4).abs() < f64::EPSILON);
        assert!((w.keyword - 0.3).abs() < f64::EPSILON);
        assert!((w.fuzzy - 0.2).abs() < f64::EPSILON);
        assert!((w.structural - 0.1).abs() < f64::EPSILON);
    }
}

//! Feedback, adaptive weights, and model-evaluation value objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One item of user relevance feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFeedback {
    /// The query text the feedback refers to
    pub query: String,
    /// The result the user rated
    pub result_id: String,
    /// Relevance in [0, 1]; 1 = fully relevant
    pub relevance_score: f64,
    /// When the feedback was recorded
    pub timestamp: DateTime<Utc>,
    /// Optional anonymous user identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl UserFeedback {
    /// Create feedback stamped with the current time
    pub fn new(query: impl Into<String>, result_id: impl Into<String>, relevance: f64) -> Self {
        Self {
            query: query.into(),
            result_id: result_id.into(),
            relevance_score: relevance.clamp(0.0, 1.0),
            timestamp: Utc::now(),
            user_id: None,
        }
    }
}

/// A fusion/rerank weight that is updated over time from feedback
///
/// Created with defaults at service start, mutated only by the
/// feedback-batch processor, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveWeight {
    /// Weight name (semantic, graph, contextual, recency, popularity, original)
    pub name: String,
    /// Current value in [0, 1]
    pub value: f64,
    /// Trust in the current value, in [0, 1]
    pub confidence: f64,
    /// When the weight was last adjusted
    pub last_updated: DateTime<Utc>,
}

impl AdaptiveWeight {
    /// Seed a weight with its default value and confidence
    pub fn seeded(name: impl Into<String>, value: f64, confidence: f64) -> Self {
        Self {
            name: name.into(),
            value,
            confidence,
            last_updated: Utc::now(),
        }
    }
}

/// One sample of the bounded model-performance history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    /// When the sample was taken
    pub timestamp: DateTime<Utc>,
    /// Smoothed model accuracy at that time
    pub accuracy: f64,
    /// Number of feedback items processed in the batch
    pub feedback_count: usize,
}

/// A versioned snapshot of the adaptive weight set, kept for rollback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Monotonically increasing snapshot version
    pub version: u64,
    /// Weight set at snapshot time, keyed by weight name
    pub weights: BTreeMap<String, AdaptiveWeight>,
    /// When the snapshot was taken
    pub saved_at: DateTime<Utc>,
}

/// One of the two competing scoring configurations under A/B evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbVariant {
    A,
    B,
}

/// Click-through comparison of the two A/B variants
///
/// `winner` is declared only when both variants have more than the
/// minimum impressions; no statistical-significance test is applied.
/// That is a documented simplification, not an oversight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestReport {
    /// Impressions recorded for variant A
    pub impressions_a: u64,
    /// Impressions recorded for variant B
    pub impressions_b: u64,
    /// Click-through rate of variant A
    pub ctr_a: f64,
    /// Click-through rate of variant B
    pub ctr_b: f64,
    /// Higher-CTR variant, when both have enough impressions
    pub winner: Option<AbVariant>,
}

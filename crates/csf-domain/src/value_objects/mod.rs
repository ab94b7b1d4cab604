//! Value objects
//!
//! Immutable data shapes exchanged between the orchestration layer, the
//! engines, and the collaborator ports.

mod explanation;
mod feedback;
mod metrics;
mod query;
mod results;
mod weights;

pub use explanation::{SearchExplanation, StrategyContribution};
pub use feedback::{
    AbTestReport, AbVariant, AdaptiveWeight, ModelSnapshot, PerformanceSample, UserFeedback,
};
pub use metrics::{BatchQueryMetrics, QueryMetrics};
pub use query::{OptimizedQuery, Query, QueryFilters, QueryOptions, SearchType};
pub use results::{
    FusedResult, HighlightKind, HybridResult, MatchHighlight, RerankedResult, SourceKind,
};
pub use weights::{FusionWeights, StrategyWeights};

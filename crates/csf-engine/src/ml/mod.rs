//! ML Scorer
//!
//! A pluggable feature-based scorer. The default model is linear over a
//! fixed feature list; prediction failure always falls back to an inline
//! weighted sum so callers never see an error from scoring. Training
//! data capture, metric evaluation, and A/B click-through comparison
//! live here; model persistence goes through the `ModelStore` port.

mod scorer;

pub use ab_test::AbTest;
pub use scorer::{
    EvaluationTrainer, LinearScoringModel, MlScorer, ModelMetrics, ModelTrainer, ScoringModel,
    TrainingExample, FEATURE_NAMES,
};

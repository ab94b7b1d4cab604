//! The pluggable feature-based scorer

use crate::ml::AbTest;
use chrono::Utc;
use csf_domain::error::{Error, Result};
use csf_domain::ports::ModelStore;
use csf_domain::value_objects::{AbTestReport, AbVariant, AdaptiveWeight, ModelSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// The six features every scoring model receives
pub const FEATURE_NAMES: &[&str] = &[
    "semantic_score",
    "graph_score",
    "contextual_score",
    "recency_score",
    "popularity_score",
    "original_score",
];

fn default_feature_weights() -> HashMap<String, f64> {
    HashMap::from([
        ("semantic_score".to_string(), 0.25),
        ("graph_score".to_string(), 0.20),
        ("contextual_score".to_string(), 0.15),
        ("recency_score".to_string(), 0.10),
        ("popularity_score".to_string(), 0.10),
        ("original_score".to_string(), 0.20),
    ])
}

/// Contract every scoring model must satisfy
pub trait ScoringModel: Send + Sync {
    /// Score a feature vector; the result is clamped to [0, 1] by the
    /// caller. Errors are recovered by the scorer's inline fallback.
    fn predict(&self, features: &HashMap<String, f64>) -> Result<f64>;

    /// Current per-feature weights, for snapshotting
    fn weights(&self) -> HashMap<String, f64>;

    /// Model identifier for logs
    fn name(&self) -> &str;
}

/// Default model: a linear weighted sum over the fixed feature list
#[derive(Debug, Clone)]
pub struct LinearScoringModel {
    weights: HashMap<String, f64>,
}

impl Default for LinearScoringModel {
    fn default() -> Self {
        Self {
            weights: default_feature_weights(),
        }
    }
}

impl LinearScoringModel {
    /// Create a linear model with explicit weights
    pub fn with_weights(weights: HashMap<String, f64>) -> Self {
        Self { weights }
    }
}

impl ScoringModel for LinearScoringModel {
    fn predict(&self, features: &HashMap<String, f64>) -> Result<f64> {
        let score: f64 = self
            .weights
            .iter()
            .map(|(name, weight)| features.get(name).copied().unwrap_or(0.0) * weight)
            .sum();
        Ok(score.clamp(0.0, 1.0))
    }

    fn weights(&self) -> HashMap<String, f64> {
        self.weights.clone()
    }

    fn name(&self) -> &str {
        "linear"
    }
}

/// One captured training example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Feature vector at scoring time
    pub features: HashMap<String, f64>,
    /// Observed relevance label in [0, 1]
    pub label: f64,
    /// Query that produced the example
    pub query: String,
    /// Scored document
    pub document_id: String,
}

/// Evaluation metrics recomputed by `train_model`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub loss: f64,
}

/// Fitting procedure extension point.
///
/// The contract fixes only the metric shape; the fitting itself is up to
/// the implementer. The default `EvaluationTrainer` evaluates the current
/// model against the buffer without refitting.
pub trait ModelTrainer: Send + Sync {
    /// Fit (or evaluate) against the captured examples
    fn fit(&self, data: &[TrainingExample], model: &dyn ScoringModel) -> Result<ModelMetrics>;
}

/// Default trainer: thresholds predictions at 0.5 against labels and
/// reports accuracy/precision/recall/f1 plus mean-squared-error loss
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationTrainer;

impl ModelTrainer for EvaluationTrainer {
    fn fit(&self, data: &[TrainingExample], model: &dyn ScoringModel) -> Result<ModelMetrics> {
        if data.is_empty() {
            return Err(Error::validation("no training data captured"));
        }

        let mut tp = 0u64;
        let mut fp = 0u64;
        let mut tn = 0u64;
        let mut fn_ = 0u64;
        let mut squared_error = 0.0;

        for example in data {
            let predicted = model.predict(&example.features)?;
            squared_error += (predicted - example.label).powi(2);
            let predicted_relevant = predicted >= 0.5;
            let actually_relevant = example.label >= 0.5;
            match (predicted_relevant, actually_relevant) {
                (true, true) => tp += 1,
                (true, false) => fp += 1,
                (false, false) => tn += 1,
                (false, true) => fn_ += 1,
            }
        }

        let total = data.len() as f64;
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok(ModelMetrics {
            accuracy: (tp + tn) as f64 / total,
            precision,
            recall,
            f1_score,
            loss: squared_error / total,
        })
    }
}

/// The scorer: pluggable model, training capture, metrics, A/B state
pub struct MlScorer {
    model: RwLock<Arc<dyn ScoringModel>>,
    trainer: Arc<dyn ModelTrainer>,
    training_enabled: bool,
    training: Mutex<Vec<TrainingExample>>,
    metrics: RwLock<Option<ModelMetrics>>,
    ab: AbTest,
    version: AtomicU64,
    store: Option<Arc<dyn ModelStore>>,
}

impl Default for MlScorer {
    fn default() -> Self {
        Self::new(Arc::new(LinearScoringModel::default()))
    }
}

impl MlScorer {
    /// Create a scorer around a model, with training capture enabled
    pub fn new(model: Arc<dyn ScoringModel>) -> Self {
        Self {
            model: RwLock::new(model),
            trainer: Arc::new(EvaluationTrainer),
            training_enabled: true,
            training: Mutex::new(Vec::new()),
            metrics: RwLock::new(None),
            ab: AbTest::new(),
            version: AtomicU64::new(0),
            store: None,
        }
    }

    /// Replace the fitting procedure
    pub fn with_trainer(mut self, trainer: Arc<dyn ModelTrainer>) -> Self {
        self.trainer = trainer;
        self
    }

    /// Attach a persistence collaborator for save/load
    pub fn with_store(mut self, store: Arc<dyn ModelStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Disable training-data capture
    pub fn with_training_disabled(mut self) -> Self {
        self.training_enabled = false;
        self
    }

    /// Score a feature vector. Never fails: a model error falls back to
    /// the inline default weighted sum.
    pub fn predict_or_fallback(&self, features: &HashMap<String, f64>) -> f64 {
        let model = self.model.read().unwrap_or_else(|e| e.into_inner()).clone();
        match model.predict(features) {
            Ok(score) => score.clamp(0.0, 1.0),
            Err(err) => {
                warn!(model = model.name(), %err, "model prediction failed, using fallback");
                let fallback: f64 = default_feature_weights()
                    .iter()
                    .map(|(name, weight)| features.get(name).copied().unwrap_or(0.0) * weight)
                    .sum();
                fallback.clamp(0.0, 1.0)
            }
        }
    }

    /// Capture one training example, if training is enabled
    pub fn add_training_data(&self, example: TrainingExample) {
        if !self.training_enabled {
            return;
        }
        self.training
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(example);
    }

    /// Number of captured training examples
    pub fn training_data_len(&self) -> usize {
        self.training.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Run the configured fitting procedure over the captured buffer and
    /// store the resulting metrics
    pub fn train_model(&self) -> Result<ModelMetrics> {
        let data = self
            .training
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let model = self.model.read().unwrap_or_else(|e| e.into_inner()).clone();
        let metrics = self.trainer.fit(&data, model.as_ref())?;
        debug!(
            examples = data.len(),
            accuracy = metrics.accuracy,
            loss = metrics.loss,
            "model trained"
        );
        *self.metrics.write().unwrap_or_else(|e| e.into_inner()) = Some(metrics);
        Ok(metrics)
    }

    /// Metrics from the most recent training run
    pub fn evaluate_model(&self) -> Option<ModelMetrics> {
        *self.metrics.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Record one A/B impression
    pub fn record_user_interaction(&self, variant: AbVariant, clicked: bool) {
        self.ab.record_interaction(variant, clicked);
    }

    /// Current A/B comparison
    pub fn ab_test_results(&self) -> AbTestReport {
        self.ab.report()
    }

    /// Snapshot the current model weights through the persistence
    /// collaborator, bumping the in-memory version
    pub async fn save_model(&self) -> Result<u64> {
        let store = self.store.as_ref().ok_or_else(|| Error::Internal {
            message: "no model store attached".to_string(),
        })?;
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let weights = self
            .model
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .weights();
        let snapshot = ModelSnapshot {
            version,
            weights: weights
                .into_iter()
                .map(|(name, value)| {
                    let weight = AdaptiveWeight::seeded(name.clone(), value, 1.0);
                    (name, weight)
                })
                .collect::<BTreeMap<_, _>>(),
            saved_at: Utc::now(),
        };
        store.save(&snapshot).await?;
        Ok(version)
    }

    /// Restore a persisted snapshot into a fresh linear model
    pub async fn load_model(&self, version: u64) -> Result<()> {
        let store = self.store.as_ref().ok_or_else(|| Error::Internal {
            message: "no model store attached".to_string(),
        })?;
        let snapshot = store.load(version).await?.ok_or_else(|| Error::Internal {
            message: format!("model version {version} not found"),
        })?;
        let weights: HashMap<String, f64> = snapshot
            .weights
            .into_iter()
            .map(|(name, w)| (name, w.value))
            .collect();
        *self.model.write().unwrap_or_else(|e| e.into_inner()) =
            Arc::new(LinearScoringModel::with_weights(weights));
        self.version.store(version, Ordering::SeqCst);
        Ok(())
    }
}

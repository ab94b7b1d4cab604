//! The weight actor: owns all mutable learning state

use crate::config::AdaptiveConfig;
use chrono::Utc;
use csf_domain::constants::{
    ACCURACY_SMOOTHING, CONFIDENCE_GAIN_FACTOR, FEEDBACK_NEGATIVE_THRESHOLD,
    FEEDBACK_POSITIVE_THRESHOLD, WEIGHT_PENALTY_RATE, WEIGHT_REINFORCEMENT_RATE,
};
use csf_domain::error::{Error, Result};
use csf_domain::value_objects::{AdaptiveWeight, ModelSnapshot, PerformanceSample, UserFeedback};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Default seed values and confidences for the six adaptive weights
const SEED_WEIGHTS: &[(&str, f64, f64)] = &[
    ("semantic", 0.40, 0.8),
    ("graph", 0.30, 0.7),
    ("contextual", 0.20, 0.6),
    ("recency", 0.05, 0.5),
    ("popularity", 0.05, 0.5),
    ("original", 0.30, 0.8),
];

/// Accuracy before any feedback has been processed
const INITIAL_ACCURACY: f64 = 0.5;

/// Messages understood by the weight actor
pub(super) enum WeightMessage {
    CollectFeedback(UserFeedback),
    Flush {
        respond_to: oneshot::Sender<usize>,
    },
    GetWeights {
        respond_to: oneshot::Sender<BTreeMap<String, AdaptiveWeight>>,
    },
    GetAccuracy {
        respond_to: oneshot::Sender<f64>,
    },
    GetHistory {
        respond_to: oneshot::Sender<Vec<PerformanceSample>>,
    },
    SaveModel {
        respond_to: oneshot::Sender<u64>,
    },
    Rollback {
        version: u64,
        respond_to: oneshot::Sender<Result<()>>,
    },
}

/// Single writer for weights, feedback buffer, history, and snapshots
pub(super) struct WeightActor {
    receiver: mpsc::Receiver<WeightMessage>,
    config: AdaptiveConfig,
    weights: BTreeMap<String, AdaptiveWeight>,
    buffer: Vec<UserFeedback>,
    model_accuracy: f64,
    history: VecDeque<PerformanceSample>,
    snapshots: VecDeque<ModelSnapshot>,
    next_version: u64,
}

impl WeightActor {
    pub(super) fn new(receiver: mpsc::Receiver<WeightMessage>, config: AdaptiveConfig) -> Self {
        let weights = SEED_WEIGHTS
            .iter()
            .map(|(name, value, confidence)| {
                (
                    (*name).to_string(),
                    AdaptiveWeight::seeded(*name, *value, *confidence),
                )
            })
            .collect();
        Self {
            receiver,
            config,
            weights,
            buffer: Vec::new(),
            model_accuracy: INITIAL_ACCURACY,
            history: VecDeque::new(),
            snapshots: VecDeque::new(),
            next_version: 1,
        }
    }

    /// Run the actor loop until every handle is dropped
    pub(super) async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                WeightMessage::CollectFeedback(feedback) => {
                    self.buffer.push(feedback);
                    if self.buffer.len() >= self.config.batch_size {
                        self.process_batch();
                    }
                }
                WeightMessage::Flush { respond_to } => {
                    let count = self.buffer.len();
                    if count > 0 {
                        self.process_batch();
                    }
                    let _ = respond_to.send(count);
                }
                WeightMessage::GetWeights { respond_to } => {
                    let _ = respond_to.send(self.weights.clone());
                }
                WeightMessage::GetAccuracy { respond_to } => {
                    let _ = respond_to.send(self.model_accuracy);
                }
                WeightMessage::GetHistory { respond_to } => {
                    let _ = respond_to.send(self.history.iter().cloned().collect());
                }
                WeightMessage::SaveModel { respond_to } => {
                    let version = self.push_snapshot();
                    let _ = respond_to.send(version);
                }
                WeightMessage::Rollback {
                    version,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.rollback(version));
                }
            }
        }
    }

    /// Apply one batch of buffered feedback to the weight set.
    ///
    /// Feedback is grouped by query text; each group's mean relevance
    /// decides whether every weight is reinforced, penalized, or left
    /// unchanged.
    fn process_batch(&mut self) {
        let batch = std::mem::take(&mut self.buffer);
        let feedback_count = batch.len();

        let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
        let mut positive = 0usize;
        for item in &batch {
            if item.relevance_score >= FEEDBACK_POSITIVE_THRESHOLD {
                positive += 1;
            }
            groups
                .entry(item.query.clone())
                .or_default()
                .push(item.relevance_score);
        }

        for (query, scores) in &groups {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            let rate = if mean >= FEEDBACK_POSITIVE_THRESHOLD {
                WEIGHT_REINFORCEMENT_RATE
            } else if mean <= FEEDBACK_NEGATIVE_THRESHOLD {
                -WEIGHT_PENALTY_RATE
            } else {
                continue;
            };
            debug!(query = query.as_str(), mean, rate, "adjusting weights");
            self.adjust_all(rate);
        }

        let positive_rate = positive as f64 / feedback_count as f64;
        self.model_accuracy = ACCURACY_SMOOTHING * self.model_accuracy
            + (1.0 - ACCURACY_SMOOTHING) * positive_rate;

        self.history.push_back(PerformanceSample {
            timestamp: Utc::now(),
            accuracy: self.model_accuracy,
            feedback_count,
        });
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }

        info!(
            feedback_count,
            accuracy = self.model_accuracy,
            "feedback batch processed"
        );
    }

    /// Adjust every weight by `rate` of its current value
    fn adjust_all(&mut self, rate: f64) {
        let now = Utc::now();
        for weight in self.weights.values_mut() {
            let adjustment = weight.value * rate;
            weight.value = (weight.value + adjustment).clamp(0.0, 1.0);
            weight.confidence =
                (weight.confidence + adjustment.abs() * CONFIDENCE_GAIN_FACTOR).clamp(0.0, 1.0);
            weight.last_updated = now;
        }
    }

    /// Snapshot the current weight set into the bounded history ring
    fn push_snapshot(&mut self) -> u64 {
        let version = self.next_version;
        self.next_version += 1;
        self.snapshots.push_back(ModelSnapshot {
            version,
            weights: self.weights.clone(),
            saved_at: Utc::now(),
        });
        while self.snapshots.len() > self.config.snapshot_limit {
            self.snapshots.pop_front();
        }
        version
    }

    /// Restore a snapshot by version. The current state is snapshotted
    /// first, so rollback never destroys history.
    fn rollback(&mut self, version: u64) -> Result<()> {
        let target = self
            .snapshots
            .iter()
            .find(|s| s.version == version)
            .cloned()
            .ok_or_else(|| {
                Error::validation(format!("model version {version} not in snapshot history"))
            })?;
        self.push_snapshot();
        self.weights = target.weights;
        info!(version, "weights rolled back");
        Ok(())
    }
}

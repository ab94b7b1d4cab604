//! The public handle to the weight actor

use crate::adaptive::actor::{WeightActor, WeightMessage};
use crate::config::AdaptiveConfig;
use csf_domain::error::{Error, Result};
use csf_domain::value_objects::{AdaptiveWeight, PerformanceSample, UserFeedback};
use std::collections::BTreeMap;
use tokio::sync::{mpsc, oneshot};

const CHANNEL_CAPACITY: usize = 64;

/// Handle to the single-writer adaptive weight store.
///
/// Clones share one actor; message ordering through the channel
/// serializes all mutation, so the batch-processing invariants hold even
/// under concurrent feedback ingestion and query serving.
#[derive(Clone)]
pub struct AdaptiveWeightStore {
    sender: mpsc::Sender<WeightMessage>,
}

impl AdaptiveWeightStore {
    /// Spawn the actor and return a handle to it
    pub fn new(config: AdaptiveConfig) -> Self {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(WeightActor::new(receiver, config).run());
        Self { sender }
    }

    /// Buffer one feedback item. Batch processing triggers automatically
    /// once the configured batch size is buffered.
    pub async fn collect_feedback(&self, feedback: UserFeedback) -> Result<()> {
        self.sender
            .send(WeightMessage::CollectFeedback(feedback))
            .await
            .map_err(|_| store_gone())
    }

    /// Force-process any buffered feedback; returns how many items were
    /// flushed
    pub async fn flush(&self) -> Result<usize> {
        self.request(|respond_to| WeightMessage::Flush { respond_to })
            .await
    }

    /// Snapshot of the current weight set
    pub async fn weights(&self) -> Result<BTreeMap<String, AdaptiveWeight>> {
        self.request(|respond_to| WeightMessage::GetWeights { respond_to })
            .await
    }

    /// Current smoothed model accuracy
    pub async fn model_accuracy(&self) -> Result<f64> {
        self.request(|respond_to| WeightMessage::GetAccuracy { respond_to })
            .await
    }

    /// Bounded performance history, oldest first
    pub async fn performance_history(&self) -> Result<Vec<PerformanceSample>> {
        self.request(|respond_to| WeightMessage::GetHistory { respond_to })
            .await
    }

    /// Snapshot the current weights for rollback; returns the new version
    pub async fn save_model(&self) -> Result<u64> {
        self.request(|respond_to| WeightMessage::SaveModel { respond_to })
            .await
    }

    /// Restore a saved snapshot by version
    pub async fn rollback_to_version(&self, version: u64) -> Result<()> {
        self.request(|respond_to| WeightMessage::Rollback {
            version,
            respond_to,
        })
        .await?
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> WeightMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(make(tx))
            .await
            .map_err(|_| store_gone())?;
        rx.await.map_err(|_| store_gone())
    }
}

fn store_gone() -> Error {
    Error::Internal {
        message: "adaptive weight store actor is no longer running".to_string(),
    }
}

//! Tests for the ML scorer, training capture, and persistence

use crate::ml::{LinearScoringModel, MlScorer, ScoringModel, TrainingExample};
use csf_domain::error::Result;
use csf_domain::ports::ModelStore;
use csf_domain::value_objects::{AbVariant, ModelSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

fn features(semantic: f64, original: f64) -> HashMap<String, f64> {
    HashMap::from([
        ("semantic_score".to_string(), semantic),
        ("original_score".to_string(), original),
    ])
}

#[test]
fn linear_model_ignores_unknown_and_missing_features() {
    let model = LinearScoringModel::default();
    let mut input = features(1.0, 1.0);
    input.insert("unknown_feature".to_string(), 100.0);
    // 1.0 * 0.25 + 1.0 * 0.20, the other four features default to zero.
    let score = model.predict(&input).unwrap();
    assert!((score - 0.45).abs() < 1e-12);
}

#[test]
fn linear_model_clamps_to_unit_interval() {
    let model = LinearScoringModel::with_weights(HashMap::from([(
        "semantic_score".to_string(),
        10.0,
    )]));
    assert_eq!(model.predict(&features(1.0, 0.0)).unwrap(), 1.0);
    assert_eq!(model.predict(&features(-1.0, 0.0)).unwrap(), 0.0);
}

#[test]
fn training_capture_respects_the_disable_switch() {
    let example = TrainingExample {
        features: features(0.9, 0.5),
        label: 1.0,
        query: "q".to_string(),
        document_id: "doc".to_string(),
    };

    let capturing = MlScorer::default();
    capturing.add_training_data(example.clone());
    assert_eq!(capturing.training_data_len(), 1);

    let disabled = MlScorer::default().with_training_disabled();
    disabled.add_training_data(example);
    assert_eq!(disabled.training_data_len(), 0);
}

#[test]
fn train_model_without_data_fails() {
    let scorer = MlScorer::default();
    assert!(scorer.train_model().is_err());
    assert!(scorer.evaluate_model().is_none());
}

#[test]
fn train_model_reports_confusion_metrics() {
    let scorer = MlScorer::default();
    // Default weights score (1,1,...) well above 0.5 and zeros at 0.0.
    let all_features: HashMap<String, f64> = crate::ml::FEATURE_NAMES
        .iter()
        .map(|n| ((*n).to_string(), 1.0))
        .collect();
    scorer.add_training_data(TrainingExample {
        features: all_features,
        label: 1.0,
        query: "q".to_string(),
        document_id: "hit".to_string(),
    });
    scorer.add_training_data(TrainingExample {
        features: HashMap::new(),
        label: 0.0,
        query: "q".to_string(),
        document_id: "miss".to_string(),
    });

    let metrics = scorer.train_model().unwrap();
    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(metrics.precision, 1.0);
    assert_eq!(metrics.recall, 1.0);
    assert_eq!(metrics.f1_score, 1.0);
    assert!(metrics.loss < 0.25);
    assert_eq!(scorer.evaluate_model(), Some(metrics));
}

#[test]
fn ab_report_needs_enough_impressions_on_both_sides() {
    let scorer = MlScorer::default();
    for _ in 0..150 {
        scorer.record_user_interaction(AbVariant::A, true);
    }
    for _ in 0..50 {
        scorer.record_user_interaction(AbVariant::B, false);
    }

    let report = scorer.ab_test_results();
    assert_eq!(report.impressions_a, 150);
    assert_eq!(report.impressions_b, 50);
    // Variant B is below the impression floor, so no winner yet.
    assert!(report.winner.is_none());
}

#[derive(Default)]
struct InMemoryModelStore {
    snapshots: Mutex<Vec<ModelSnapshot>>,
}

#[async_trait]
impl ModelStore for InMemoryModelStore {
    async fn save(&self, snapshot: &ModelSnapshot) -> Result<()> {
        self.snapshots.lock().await.push(snapshot.clone());
        Ok(())
    }

    async fn load(&self, version: u64) -> Result<Option<ModelSnapshot>> {
        Ok(self
            .snapshots
            .lock()
            .await
            .iter()
            .find(|s| s.version == version)
            .cloned())
    }
}

#[tokio::test]
async fn save_then_load_keeps_prediction_behavior() {
    let store = Arc::new(InMemoryModelStore::default());
    let scorer = MlScorer::default().with_store(store);

    let input = features(0.8, 0.6);
    let before = scorer.predict_or_fallback(&input);

    let version = scorer.save_model().await.unwrap();
    assert_eq!(version, 1);
    scorer.load_model(version).await.unwrap();

    let after = scorer.predict_or_fallback(&input);
    assert!((before - after).abs() < 1e-12);
}

#[tokio::test]
async fn persistence_requires_an_attached_store() {
    let scorer = MlScorer::default();
    assert!(scorer.save_model().await.is_err());
    assert!(scorer.load_model(1).await.is_err());
}

#[tokio::test]
async fn loading_an_unknown_version_fails() {
    let scorer = MlScorer::default().with_store(Arc::new(InMemoryModelStore::default()));
    assert!(scorer.load_model(99).await.is_err());
}

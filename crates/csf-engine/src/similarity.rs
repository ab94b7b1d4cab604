//! Stateless similarity primitives
//!
//! Numeric and text similarity functions used throughout fusion and
//! reranking. Vector functions require equal-length inputs and return
//! `Error::DimensionMismatch` otherwise.
//!
//! Empty-set conventions (deliberate, see DESIGN.md): `jaccard_similarity`
//! of two empty sets is 0 (no evidence of overlap), while
//! `contextual_similarity` of two empty chains is 1 (identical contexts).

use csf_domain::entities::Candidate;
use csf_domain::error::{Error, Result};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

fn check_dims(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Cosine similarity of two equal-length vectors.
///
/// A zero vector on either side yields 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    check_dims(a, b)?;
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

/// Euclidean distance between two equal-length vectors
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_dims(a, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt())
}

/// Dot product of two equal-length vectors
pub fn dot_product_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    check_dims(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Jaccard similarity of two sets: |A ∩ B| / |A ∪ B|.
///
/// Two empty sets yield 0 by convention.
pub fn jaccard_similarity<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Standard edit distance via the full dynamic-programming matrix
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        matrix[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }
    matrix[a.len()][b.len()]
}

/// Per-feature closeness of two feature maps, averaged uniformly.
///
/// Numeric features score `1 − |a−b| / max(a, b)` with `max = 0` treated
/// as fully close; booleans and strings score on equality; a type
/// mismatch or a feature missing on one side scores 0.
pub fn feature_based_similarity(a: &HashMap<String, Value>, b: &HashMap<String, Value>) -> f64 {
    let keys: HashSet<&String> = a.keys().chain(b.keys()).collect();
    if keys.is_empty() {
        return 0.0;
    }

    let total: f64 = keys
        .iter()
        .map(|key| match (a.get(*key), b.get(*key)) {
            (Some(Value::Number(x)), Some(Value::Number(y))) => {
                let x = x.as_f64().unwrap_or(0.0);
                let y = y.as_f64().unwrap_or(0.0);
                let max = x.abs().max(y.abs());
                if max == 0.0 {
                    1.0
                } else {
                    1.0 - (x - y).abs() / max
                }
            }
            (Some(Value::Bool(x)), Some(Value::Bool(y))) => {
                if x == y {
                    1.0
                } else {
                    0.0
                }
            }
            (Some(Value::String(x)), Some(Value::String(y))) => {
                if x == y {
                    1.0
                } else {
                    0.0
                }
            }
            _ => 0.0,
        })
        .sum();

    total / keys.len() as f64
}

/// Structural similarity of two candidates over their shape features
pub fn structural_similarity(a: &Candidate, b: &Candidate) -> f64 {
    feature_based_similarity(&structural_features(a), &structural_features(b))
}

fn structural_features(c: &Candidate) -> HashMap<String, Value> {
    let mut features = HashMap::new();
    features.insert("language".to_string(), Value::String(c.language.clone()));
    features.insert(
        "chunk_type".to_string(),
        Value::String(format!("{:?}", c.chunk_type)),
    );
    features.insert(
        "line_count".to_string(),
        Value::from(c.line_range.end.saturating_sub(c.line_range.start) + 1),
    );
    features.insert("exported".to_string(), Value::Bool(c.metadata.exported));
    features
}

/// Similarity of two context chains (e.g. call or module paths).
///
/// Both empty yields 1 (identical contexts); exactly one empty yields 0;
/// otherwise Jaccard over the token sets.
pub fn contextual_similarity(a: &[String], b: &[String]) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let set_a: HashSet<&String> = a.iter().collect();
            let set_b: HashSet<&String> = b.iter().collect();
            jaccard_similarity(&set_a, &set_b)
        }
    }
}

/// Weighted mean of an ensemble of similarity scores.
///
/// `None` weights means a uniform mean. Empty scores yield 0; a weight
/// vector of mismatched length is a validation error.
pub fn ensemble_similarity(scores: &[f64], weights: Option<&[f64]>) -> Result<f64> {
    if scores.is_empty() {
        return Ok(0.0);
    }
    match weights {
        None => Ok(scores.iter().sum::<f64>() / scores.len() as f64),
        Some(w) => {
            if w.len() != scores.len() {
                return Err(Error::validation(format!(
                    "ensemble weights length {} does not match scores length {}",
                    w.len(),
                    scores.len()
                )));
            }
            let weight_sum: f64 = w.iter().sum();
            if weight_sum == 0.0 {
                return Ok(0.0);
            }
            let weighted: f64 = scores.iter().zip(w).map(|(s, w)| s * w).sum();
            Ok(weighted / weight_sum)
        }
    }
}

//! Fuzzy strategy: edit-distance tolerant term matching

use crate::similarity::levenshtein_distance;
use async_trait::async_trait;
use csf_domain::entities::ScoredCandidate;
use csf_domain::error::Result;
use csf_domain::ports::{CandidateSource, SearchOpts, SearchStrategy};
use csf_domain::value_objects::SourceKind;
use std::collections::HashSet;
use std::sync::Arc;

/// Minimum per-candidate score for a fuzzy hit to be returned
const FUZZY_MIN_SCORE: f64 = 0.3;

/// Scores candidates by the best normalized edit-distance similarity of
/// each query term against the candidate's content tokens, averaged over
/// all terms. Tolerates typos and morphological variants the keyword
/// strategy misses.
pub struct FuzzyStrategy {
    source: Arc<dyn CandidateSource>,
}

impl FuzzyStrategy {
    /// Create a fuzzy strategy over a candidate corpus
    pub fn new(source: Arc<dyn CandidateSource>) -> Self {
        Self { source }
    }
}

fn term_similarity(term: &str, tokens: &HashSet<String>) -> f64 {
    tokens
        .iter()
        .map(|token| {
            let max_len = term.chars().count().max(token.chars().count());
            if max_len == 0 {
                return 0.0;
            }
            1.0 - levenshtein_distance(term, token) as f64 / max_len as f64
        })
        .fold(0.0, f64::max)
}

#[async_trait]
impl SearchStrategy for FuzzyStrategy {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Fuzzy
    }

    async fn run(&self, query: &str, opts: &SearchOpts) -> Result<Vec<ScoredCandidate>> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<ScoredCandidate> = self
            .source
            .candidates(&opts.project_id)
            .await?
            .into_iter()
            .filter_map(|candidate| {
                let tokens: HashSet<String> = candidate
                    .content
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|t| !t.is_empty())
                    .map(str::to_lowercase)
                    .collect();
                let score = terms
                    .iter()
                    .map(|t| term_similarity(t, &tokens))
                    .sum::<f64>()
                    / terms.len() as f64;
                if score < FUZZY_MIN_SCORE {
                    return None;
                }
                Some(ScoredCandidate {
                    candidate,
                    score,
                    source: SourceKind::Fuzzy,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(opts.limit);
        Ok(hits)
    }
}

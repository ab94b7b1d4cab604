//! Query intent classification
//!
//! Keyword-membership classification: structural markers pull weight
//! toward the graph source, semantic markers toward the vector source.
//! A query can carry both intents; the weight adjustments then stack.

use csf_domain::constants::{SEMANTIC_MARKERS, STRUCTURAL_MARKERS};

/// Intent flags derived from the query text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryIntent {
    /// Query asks about code structure (dependencies, calls, hierarchy)
    pub structural: bool,
    /// Query asks for meaning or explanation
    pub semantic: bool,
}

/// Classify a query by marker-keyword membership
pub fn classify_intent(text: &str) -> QueryIntent {
    let terms: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();

    QueryIntent {
        structural: terms.iter().any(|t| STRUCTURAL_MARKERS.contains(&t.as_str())),
        semantic: terms.iter().any(|t| SEMANTIC_MARKERS.contains(&t.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_markers_are_detected() {
        let intent = classify_intent("find dependency graph of the parser");
        assert!(intent.structural);
        assert!(!intent.semantic);
    }

    #[test]
    fn semantic_markers_are_detected() {
        let intent = classify_intent("what does the scheduler do");
        assert!(intent.semantic);
        assert!(!intent.structural);
    }

    #[test]
    fn both_intents_can_coexist() {
        let intent = classify_intent("explain the class hierarchy");
        assert!(intent.structural);
        assert!(intent.semantic);
    }

    #[test]
    fn matching_is_case_insensitive_and_whole_word() {
        assert!(classify_intent("IMPORTS of main").structural);
        // "classy" is not the marker "class".
        assert!(!classify_intent("classy formatting").structural);
    }
}

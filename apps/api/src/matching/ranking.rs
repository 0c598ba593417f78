//! Ranking and labeling policy.
//!
//! Scores map onto ordinal bands; ranked sets are capped at 3, deduplicated
//! by candidate id server-side, and ordered (score desc, id asc) so repeated
//! requests always produce the same list.

use uuid::Uuid;

use crate::matching::scorer::MatchResult;

pub const HIGHLY_RECOMMENDED: &str = "Highly Recommended";
pub const RECOMMENDED: &str = "Recommended";
pub const EXPLORE: &str = "Explore";

const HIGHLY_RECOMMENDED_MIN: f64 = 0.75;
const RECOMMENDED_MIN: f64 = 0.5;

pub const TOP_N: usize = 3;

/// Band boundaries resolve upward: exactly 0.75 is "Highly Recommended",
/// exactly 0.5 is "Recommended".
pub fn label_for(score: f64) -> &'static str {
    if score >= HIGHLY_RECOMMENDED_MIN {
        HIGHLY_RECOMMENDED
    } else if score >= RECOMMENDED_MIN {
        RECOMMENDED
    } else {
        EXPLORE
    }
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub id: Uuid,
    pub result: MatchResult,
}

/// Dedupes by candidate id (highest score survives), sorts by score
/// descending with ascending-id tie-break, and truncates to `TOP_N`.
/// Fewer than 3 candidates yield fewer than 3 results, never padding.
pub fn rank_top_matches(scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    let mut best: std::collections::HashMap<Uuid, ScoredCandidate> = std::collections::HashMap::new();
    for candidate in scored {
        match best.get(&candidate.id) {
            Some(existing) if existing.result.score >= candidate.result.score => {}
            _ => {
                best.insert(candidate.id, candidate);
            }
        }
    }

    let mut ranked: Vec<ScoredCandidate> = best.into_values().collect();
    ranked.sort_by(|a, b| {
        b.result
            .score
            .total_cmp(&a.result.score)
            .then(a.id.cmp(&b.id))
    });
    ranked.truncate(TOP_N);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::explain::Explanation;

    fn result(score: f64) -> MatchResult {
        MatchResult {
            score,
            label: label_for(score).to_string(),
            explanation: Explanation {
                summary: String::new(),
                skills_matched: vec![],
                skills_missing: vec![],
                resume_highlights: vec![],
                jd_role: None,
                resume_role: None,
            },
        }
    }

    fn candidate(id: u128, score: f64) -> ScoredCandidate {
        ScoredCandidate {
            id: Uuid::from_u128(id),
            result: result(score),
        }
    }

    #[test]
    fn test_label_bands() {
        assert_eq!(label_for(0.8), HIGHLY_RECOMMENDED);
        assert_eq!(label_for(0.6), RECOMMENDED);
        assert_eq!(label_for(0.3), EXPLORE);
    }

    #[test]
    fn test_boundaries_resolve_to_higher_band() {
        assert_eq!(label_for(0.75), HIGHLY_RECOMMENDED);
        assert_eq!(label_for(0.5), RECOMMENDED);
        assert_eq!(label_for(0.7499), RECOMMENDED);
        assert_eq!(label_for(0.4999), EXPLORE);
    }

    #[test]
    fn test_caps_at_three() {
        let ranked = rank_top_matches(vec![
            candidate(1, 0.9),
            candidate(2, 0.8),
            candidate(3, 0.7),
            candidate(4, 0.6),
        ]);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].id, Uuid::from_u128(1));
        assert_eq!(ranked[2].id, Uuid::from_u128(3));
    }

    #[test]
    fn test_fewer_candidates_never_padded() {
        let ranked = rank_top_matches(vec![candidate(1, 0.4)]);
        assert_eq!(ranked.len(), 1);
        assert!(rank_top_matches(vec![]).is_empty());
    }

    #[test]
    fn test_duplicates_removed_keeping_highest_score() {
        let ranked = rank_top_matches(vec![
            candidate(7, 0.5),
            candidate(7, 0.9),
            candidate(7, 0.2),
        ]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].result.score, 0.9);
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let ranked = rank_top_matches(vec![
            candidate(9, 0.7),
            candidate(2, 0.7),
            candidate(5, 0.7),
        ]);
        let ids: Vec<Uuid> = ranked.iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(2), Uuid::from_u128(5), Uuid::from_u128(9)]
        );
    }

    #[test]
    fn test_sorted_descending_by_score() {
        let ranked = rank_top_matches(vec![
            candidate(1, 0.2),
            candidate(2, 0.95),
            candidate(3, 0.6),
        ]);
        let scores: Vec<f64> = ranked.iter().map(|c| c.result.score).collect();
        assert_eq!(scores, vec![0.95, 0.6, 0.2]);
    }
}

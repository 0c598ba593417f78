//! Deterministic TF-IDF cosine similarity over a document pair.
//!
//! The corpus is exactly the two documents being compared, with smoothed
//! IDF so shared terms still carry weight. Symmetric in its arguments and
//! free of any randomness: identical inputs always produce the identical
//! score.

use std::collections::BTreeMap;

/// Cosine similarity of TF-IDF vectors for `a` and `b`, in [0, 1].
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let tf_a = term_frequencies(a);
    let tf_b = term_frequencies(b);
    if tf_a.is_empty() || tf_b.is_empty() {
        return 0.0;
    }

    // idf(t) = ln((1 + n_docs) / (1 + df)) + 1, n_docs = 2
    let idf = |term: &str| -> f64 {
        let df = tf_a.contains_key(term) as u32 + tf_b.contains_key(term) as u32;
        ((1.0 + 2.0) / (1.0 + df as f64)).ln() + 1.0
    };

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (term, &count) in &tf_a {
        let weight = count * idf(term);
        norm_a += weight * weight;
        if let Some(&other) = tf_b.get(term) {
            dot += weight * (other * idf(term));
        }
    }
    for (term, &count) in &tf_b {
        let weight = count * idf(term);
        norm_b += weight * weight;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

/// Lowercased alphanumeric tokens of length ≥ 2, with raw counts.
/// BTreeMap keeps iteration order stable.
fn term_frequencies(text: &str) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
    {
        *counts.entry(token.to_lowercase()).or_insert(0.0) += 1.0;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_score_one() {
        let text = "Senior Rust engineer building distributed systems";
        let sim = cosine_similarity(text, text);
        assert!((sim - 1.0).abs() < 1e-9, "similarity was {sim}");
    }

    #[test]
    fn test_disjoint_texts_score_zero() {
        let sim = cosine_similarity("alpha beta gamma", "delta epsilon zeta");
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = "python developer with aws experience";
        let b = "java engineer who knows aws and docker";
        assert_eq!(cosine_similarity(a, b), cosine_similarity(b, a));
    }

    #[test]
    fn test_deterministic() {
        let a = "machine learning on large datasets";
        let b = "learning from large production datasets";
        assert_eq!(cosine_similarity(a, b), cosine_similarity(a, b));
    }

    #[test]
    fn test_bounded() {
        let a = "rust rust rust tokio axum";
        let b = "rust tokio services in production";
        let sim = cosine_similarity(a, b);
        assert!((0.0..=1.0).contains(&sim));
    }

    #[test]
    fn test_partial_overlap_between_extremes() {
        let a = "python aws docker backend services";
        let b = "python aws frontend design figma";
        let sim = cosine_similarity(a, b);
        assert!(sim > 0.0 && sim < 1.0, "similarity was {sim}");
    }

    #[test]
    fn test_empty_input_scores_zero() {
        assert_eq!(cosine_similarity("", "some text"), 0.0);
        assert_eq!(cosine_similarity("", ""), 0.0);
    }
}

//! Match scoring — pluggable, trait-based scorer comparing a JD against a
//! candidate document.
//!
//! Default: `WeightedScorer` (pure-Rust, fast, deterministic, fully
//! testable). `AppState` holds an `Arc<dyn MatchScorer>` so the backend can
//! be swapped without touching handlers.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::explain::{build_explanation, Explanation};
use crate::matching::ranking::label_for;
use crate::matching::similarity::cosine_similarity;
use crate::models::jd::JdRow;
use crate::models::profile::{ProfileRow, ResumeRow};

/// Half-life of the experience shortfall decay, in years: a candidate one
/// half-life short of the requirement gets 0.5 credit.
const EXPERIENCE_HALF_LIFE_YEARS: f64 = 2.0;

/// Verticals recognized for the domain-affinity bump.
const KNOWN_DOMAINS: &[&str] = &[
    "banking",
    "healthcare",
    "ecommerce",
    "automotive",
    "insurance",
    "retail",
];

// ────────────────────────────────────────────────────────────────────────────
// Input / output data models
// ────────────────────────────────────────────────────────────────────────────

/// Comparable representation of a JD or candidate document.
#[derive(Debug, Clone)]
pub struct MatchDoc {
    pub id: Uuid,
    pub text: String,
    pub skills: BTreeSet<String>,
    /// None means the document never states a number, distinct from zero.
    pub experience_years: Option<f64>,
}

impl MatchDoc {
    pub fn from_jd(row: &JdRow) -> Self {
        Self {
            id: row.id,
            text: row.extracted_text.clone(),
            skills: row.skills.iter().cloned().collect(),
            experience_years: row.required_experience_years,
        }
    }

    pub fn from_profile(row: &ProfileRow) -> Self {
        Self {
            id: row.id,
            text: row.extracted_text.clone(),
            skills: row.skills.iter().cloned().collect(),
            experience_years: row.experience_years,
        }
    }

    pub fn from_resume(row: &ResumeRow) -> Self {
        Self {
            id: row.id,
            text: row.extracted_text.clone(),
            skills: row.skills.iter().cloned().collect(),
            experience_years: row.experience_years,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Clamped to [0, 1].
    pub score: f64,
    pub label: String,
    pub explanation: Explanation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skill: f64,
    pub experience: f64,
    pub semantic: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill: 0.4,
            experience: 0.2,
            semantic: 0.4,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The match scorer trait. Implement this to swap backends without touching
/// the endpoint, handler, or caller code.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, jd: &MatchDoc, candidate: &MatchDoc) -> Result<MatchResult, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// WeightedScorer — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Weighted combination of skill overlap, experience adequacy, and TF-IDF
/// semantic similarity, plus a small domain-affinity bump. No randomness:
/// identical input texts always produce the identical result.
pub struct WeightedScorer {
    weights: ScoringWeights,
    domain_boost: f64,
}

impl WeightedScorer {
    pub fn new(weights: ScoringWeights, domain_boost: f64) -> Self {
        Self {
            weights,
            domain_boost,
        }
    }

    fn compute(&self, jd: &MatchDoc, candidate: &MatchDoc) -> MatchResult {
        let skill_overlap = skill_overlap(&jd.skills, &candidate.skills);
        let adequacy = experience_adequacy(jd.experience_years, candidate.experience_years);
        let semantic = cosine_similarity(&jd.text, &candidate.text);

        let w = &self.weights;
        // When experience is unspecified on either side the component is
        // dropped and its weight redistributed pro rata.
        let mut score = match adequacy {
            Some(exp) => w.skill * skill_overlap + w.experience * exp + w.semantic * semantic,
            None => {
                let denom = w.skill + w.semantic;
                if denom > 0.0 {
                    (w.skill * skill_overlap + w.semantic * semantic) / denom
                } else {
                    0.0
                }
            }
        };

        if let Some(domain) = detect_domain(&jd.text) {
            if candidate.text.to_lowercase().contains(domain) {
                score += self.domain_boost;
            }
        }

        let score = score.clamp(0.0, 1.0);
        let explanation =
            build_explanation(&jd.text, &jd.skills, &candidate.text, &candidate.skills);

        MatchResult {
            score,
            label: label_for(score).to_string(),
            explanation,
        }
    }
}

#[async_trait]
impl MatchScorer for WeightedScorer {
    async fn score(&self, jd: &MatchDoc, candidate: &MatchDoc) -> Result<MatchResult, AppError> {
        Ok(self.compute(jd, candidate))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Score components
// ────────────────────────────────────────────────────────────────────────────

/// |JD ∩ candidate| / |JD ∪ candidate|; 0 when both sets are empty.
fn skill_overlap(jd_skills: &BTreeSet<String>, candidate_skills: &BTreeSet<String>) -> f64 {
    let union = jd_skills.union(candidate_skills).count();
    if union == 0 {
        return 0.0;
    }
    let matched = jd_skills.intersection(candidate_skills).count();
    matched as f64 / union as f64
}

/// 1.0 when the candidate meets the requirement; half-life decay on the
/// shortfall below it. None when either side is unspecified; the component
/// is then excluded rather than silently treated as zero.
fn experience_adequacy(required: Option<f64>, actual: Option<f64>) -> Option<f64> {
    match (required, actual) {
        (Some(required), Some(actual)) => {
            if required <= 0.0 || actual >= required {
                Some(1.0)
            } else {
                let shortfall = required - actual;
                Some((0.5_f64).powf(shortfall / EXPERIENCE_HALF_LIFE_YEARS))
            }
        }
        _ => None,
    }
}

fn detect_domain(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    KNOWN_DOMAINS
        .iter()
        .find(|domain| lower.contains(*domain))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::ranking::RECOMMENDED;

    fn doc(id: u128, text: &str, skills: &[&str], experience: Option<f64>) -> MatchDoc {
        MatchDoc {
            id: Uuid::from_u128(id),
            text: text.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_years: experience,
        }
    }

    fn scorer() -> WeightedScorer {
        WeightedScorer::new(ScoringWeights::default(), 0.05)
    }

    #[test]
    fn test_score_is_deterministic_including_explanation() {
        let jd = doc(1, "Python and AWS role, 3+ years", &["python", "aws"], Some(3.0));
        let resume = doc(2, "Python developer, 4 years on AWS", &["python", "aws"], Some(4.0));
        let first = scorer().compute(&jd, &resume);
        let second = scorer().compute(&jd, &resume);
        assert_eq!(first.score, second.score);
        assert_eq!(first.label, second.label);
        assert_eq!(first.explanation, second.explanation);
    }

    #[test]
    fn test_score_clamped_to_unit_interval() {
        // Perfect everything + a large boost must still clamp to 1.0
        let jd = doc(1, "banking python role", &["python"], Some(2.0));
        let resume = doc(2, "banking python role", &["python"], Some(5.0));
        let boosted = WeightedScorer::new(ScoringWeights::default(), 0.5);
        let result = boosted.compute(&jd, &resume);
        assert!(result.score <= 1.0);
        assert!(result.score >= 0.0);
    }

    #[test]
    fn test_experience_adequacy_met() {
        assert_eq!(experience_adequacy(Some(3.0), Some(5.0)), Some(1.0));
        assert_eq!(experience_adequacy(Some(3.0), Some(3.0)), Some(1.0));
        assert_eq!(experience_adequacy(Some(0.0), Some(0.0)), Some(1.0));
    }

    #[test]
    fn test_experience_shortfall_decays() {
        // One half-life (2 years) short → 0.5
        let credit = experience_adequacy(Some(5.0), Some(3.0)).unwrap();
        assert!((credit - 0.5).abs() < 1e-9, "credit was {credit}");
        // Larger shortfall decays further
        let worse = experience_adequacy(Some(5.0), Some(1.0)).unwrap();
        assert!(worse < credit);
    }

    #[test]
    fn test_unspecified_experience_excludes_component() {
        assert_eq!(experience_adequacy(None, Some(4.0)), None);
        assert_eq!(experience_adequacy(Some(4.0), None), None);

        // With the component dropped, two otherwise-identical docs still
        // score: the remaining weights are renormalized, not zeroed.
        let jd = doc(1, "python aws services", &["python", "aws"], None);
        let resume = doc(2, "python aws services", &["python", "aws"], None);
        let result = scorer().compute(&jd, &resume);
        assert!((result.score - 1.0).abs() < 1e-9, "score was {}", result.score);
    }

    #[test]
    fn test_skill_overlap_empty_sets_is_zero() {
        assert_eq!(skill_overlap(&BTreeSet::new(), &BTreeSet::new()), 0.0);
    }

    #[test]
    fn test_domain_boost_applies() {
        let jd = doc(1, "Role in the banking domain, 2 years", &["python"], Some(2.0));
        let with_domain = doc(2, "Built banking systems in python, 3 years", &["python"], Some(3.0));
        let without_domain = doc(
            3,
            "Built banking systems in python, 3 years".replace("banking", "logistics").as_str(),
            &["python"],
            Some(3.0),
        );
        let s = scorer();
        let boosted = s.compute(&jd, &with_domain).score;
        let plain = s.compute(&jd, &without_domain).score;
        assert!(boosted > plain);
    }

    #[test]
    fn test_recommended_band_scenario() {
        // JD requires {python, aws, docker}; resume declares {python, aws}
        // and meets the experience bar; moderate textual overlap.
        let jd = doc(
            1,
            "Backend Engineer\nWe need python, aws and docker skills.\n3+ years experience required.\nOwn deployment pipelines and cloud infrastructure.",
            &["python", "aws", "docker"],
            Some(3.0),
        );
        let resume = doc(
            2,
            "Jane Doe\nBackend developer with python and aws.\n4 years experience building services.\nShipped data tooling and internal dashboards.",
            &["python", "aws"],
            Some(4.0),
        );
        let result = scorer().compute(&jd, &resume);

        assert_eq!(result.explanation.skills_matched, vec!["aws", "python"]);
        assert_eq!(result.explanation.skills_missing, vec!["docker"]);
        assert_eq!(result.label, RECOMMENDED, "score was {}", result.score);
    }

    #[tokio::test]
    async fn test_trait_object_scoring() {
        let jd = doc(1, "python role", &["python"], None);
        let resume = doc(2, "python person", &["python"], None);
        let scorer: std::sync::Arc<dyn MatchScorer> = std::sync::Arc::new(scorer());
        let result = scorer.score(&jd, &resume).await.unwrap();
        assert!(result.score > 0.0);
    }
}

//! Structured match explanations.
//!
//! Always a single structured type, never a serialized-string/object
//! union, so callers never need defensive parsing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ingest::extract::extract_role_title;

pub const MAX_HIGHLIGHTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    /// Exact vocabulary tokens present in both JD and candidate, sorted.
    pub skills_matched: Vec<String>,
    /// JD-required tokens absent from the candidate, sorted.
    pub skills_missing: Vec<String>,
    /// Up to 5 candidate lines mentioning a matched skill, in document order.
    pub resume_highlights: Vec<String>,
    pub jd_role: Option<String>,
    pub resume_role: Option<String>,
}

pub fn build_explanation(
    jd_text: &str,
    jd_skills: &BTreeSet<String>,
    resume_text: &str,
    resume_skills: &BTreeSet<String>,
) -> Explanation {
    let matched: Vec<String> = jd_skills.intersection(resume_skills).cloned().collect();
    let missing: Vec<String> = jd_skills.difference(resume_skills).cloned().collect();

    let resume_highlights: Vec<String> = resume_text
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lower = line.to_lowercase();
            matched.iter().any(|skill| lower.contains(skill.as_str()))
        })
        .take(MAX_HIGHLIGHTS)
        .map(String::from)
        .collect();

    let aligned_words = word_alignment_count(jd_text, resume_text);
    let summary = format!(
        "{} matched, {} missing; {} words aligned.",
        matched.len(),
        missing.len(),
        aligned_words
    );

    Explanation {
        summary,
        skills_matched: matched,
        skills_missing: missing,
        resume_highlights,
        jd_role: extract_role_title(jd_text),
        resume_role: extract_role_title(resume_text),
    }
}

/// Count of distinct JD words that also appear in the resume.
fn word_alignment_count(jd_text: &str, resume_text: &str) -> usize {
    let words = |text: &str| -> BTreeSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 2)
            .map(str::to_lowercase)
            .collect()
    };
    let jd_words = words(jd_text);
    let resume_words = words(resume_text);
    jd_words.intersection(&resume_words).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matched_and_missing_are_disjoint_and_cover_jd() {
        let jd = skills(&["python", "aws", "docker"]);
        let resume = skills(&["python", "aws", "react"]);
        let exp = build_explanation("JD text", &jd, "Resume text", &resume);

        assert_eq!(exp.skills_matched, vec!["aws", "python"]);
        assert_eq!(exp.skills_missing, vec!["docker"]);
        for skill in &exp.skills_matched {
            assert!(!exp.skills_missing.contains(skill));
        }
        let covered: BTreeSet<String> = exp
            .skills_matched
            .iter()
            .chain(exp.skills_missing.iter())
            .cloned()
            .collect();
        assert!(jd.is_subset(&covered));
    }

    #[test]
    fn test_highlights_capped_at_five() {
        let jd = skills(&["python"]);
        let resume = skills(&["python"]);
        let resume_text = (0..10)
            .map(|i| format!("line {i} about python"))
            .collect::<Vec<_>>()
            .join("\n");
        let exp = build_explanation("needs python", &jd, &resume_text, &resume);
        assert_eq!(exp.resume_highlights.len(), MAX_HIGHLIGHTS);
    }

    #[test]
    fn test_highlights_mention_matched_skill() {
        let jd = skills(&["aws"]);
        let resume = skills(&["aws"]);
        let resume_text = "Intro line\nDeployed on AWS Lambda\nClosing line";
        let exp = build_explanation("aws role", &jd, resume_text, &resume);
        assert_eq!(exp.resume_highlights, vec!["Deployed on AWS Lambda"]);
    }

    #[test]
    fn test_roles_come_from_first_lines() {
        let jd = skills(&[]);
        let resume = skills(&[]);
        let exp = build_explanation(
            "Platform Engineer\ndetails",
            &jd,
            "Jane Doe\nresume body",
            &resume,
        );
        assert_eq!(exp.jd_role.as_deref(), Some("Platform Engineer"));
        assert_eq!(exp.resume_role.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_summary_counts() {
        let jd = skills(&["python", "docker"]);
        let resume = skills(&["python"]);
        let exp = build_explanation("python docker", &jd, "python resume", &resume);
        assert!(exp.summary.starts_with("1 matched, 1 missing"));
    }
}

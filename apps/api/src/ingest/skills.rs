//! Skill extraction against a controlled vocabulary.
//!
//! Two passes: a case-insensitive Aho-Corasick scan for exact vocabulary
//! terms, then a Jaro-Winkler pass that maps near-miss tokens ("kubernets")
//! back onto vocabulary terms. Unknown tokens are dropped, never invented.

use std::collections::BTreeSet;

use aho_corasick::AhoCorasick;
use anyhow::{Context, Result};
use regex::Regex;
use strsim::jaro_winkler;

/// Controlled vocabulary. Canonical form is lowercase.
const DEFAULT_TERMS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "sql",
    "html",
    "css",
    "react",
    "angular",
    "vue",
    "node.js",
    "node",
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "terraform",
    "ansible",
    "jenkins",
    "mongodb",
    "postgresql",
    "mysql",
    "redis",
    "kafka",
    "spark",
    "hadoop",
    "airflow",
    "snowflake",
    "linux",
    "flask",
    "django",
    "spring",
    "c++",
    "c#",
    "golang",
    "rust",
    "scala",
    "git",
    "github",
    "data analysis",
    "pandas",
    "numpy",
    "machine learning",
    "deep learning",
    "nlp",
    "excel",
    "power bi",
    "tableau",
    "api",
    "rest",
    "graphql",
    "microservices",
    "selenium",
    "junit",
    "agile",
    "scrum",
];

/// Minimum token length considered for the fuzzy pass. Short tokens produce
/// too many accidental high-similarity pairs.
const FUZZY_MIN_TOKEN_LEN: usize = 5;
const FUZZY_THRESHOLD: f64 = 0.93;

pub struct SkillVocabulary {
    terms: Vec<String>,
    automaton: AhoCorasick,
    token_re: Regex,
}

impl SkillVocabulary {
    pub fn with_default_terms() -> Result<Self> {
        Self::new(DEFAULT_TERMS.iter().map(|s| s.to_string()).collect())
    }

    pub fn new(mut terms: Vec<String>) -> Result<Self> {
        for term in &mut terms {
            *term = term.to_lowercase();
        }
        terms.sort();
        terms.dedup();
        // Longest-first so "node.js" wins over "node" on overlap
        terms.sort_by(|a, b| b.len().cmp(&a.len()));

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(aho_corasick::MatchKind::LeftmostLongest)
            .build(&terms)
            .context("Failed to build skill vocabulary automaton")?;

        let token_re = Regex::new(r"[A-Za-z][A-Za-z+#.]{1,19}")
            .context("Failed to compile skill token pattern")?;

        Ok(Self {
            terms,
            automaton,
            token_re,
        })
    }

    /// Extracts the set of vocabulary skills present in `text`.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let bytes = text.as_bytes();

        for mat in self.automaton.find_iter(text) {
            if is_word_boundary(bytes, mat.start(), mat.end()) {
                found.insert(self.terms[mat.pattern().as_usize()].clone());
            }
        }

        // Fuzzy pass: single-word tokens that almost spell a vocabulary term
        for token in self.token_re.find_iter(text) {
            let token = token.as_str().to_lowercase();
            if token.len() < FUZZY_MIN_TOKEN_LEN || found.contains(&token) {
                continue;
            }
            for term in &self.terms {
                if term.len() < FUZZY_MIN_TOKEN_LEN || term.contains(' ') {
                    continue;
                }
                if jaro_winkler(&token, term) >= FUZZY_THRESHOLD {
                    found.insert(term.clone());
                    break;
                }
            }
        }

        found
    }
}

fn is_word_boundary(text: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !text[start - 1].is_ascii_alphanumeric();
    let after_ok = end >= text.len() || !text[end].is_ascii_alphanumeric();
    before_ok && after_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> SkillVocabulary {
        SkillVocabulary::with_default_terms().unwrap()
    }

    #[test]
    fn test_extracts_known_skills_case_insensitive() {
        let skills = vocab().extract("Strong Python and AWS experience, some Docker.");
        assert!(skills.contains("python"));
        assert!(skills.contains("aws"));
        assert!(skills.contains("docker"));
    }

    #[test]
    fn test_unknown_tokens_are_dropped() {
        let skills = vocab().extract("Expert in underwater basket weaving");
        assert!(skills.is_empty());
    }

    #[test]
    fn test_substring_does_not_match() {
        // "java" must not fire inside "javanese"
        let skills = vocab().extract("Fluent in Javanese");
        assert!(!skills.contains("java"));
    }

    #[test]
    fn test_longest_term_wins_on_overlap() {
        let skills = vocab().extract("Built services in node.js");
        assert!(skills.contains("node.js"));
    }

    #[test]
    fn test_multiword_terms() {
        let skills = vocab().extract("Applied machine learning to churn data");
        assert!(skills.contains("machine learning"));
    }

    #[test]
    fn test_fuzzy_near_miss_maps_to_vocabulary() {
        let skills = vocab().extract("Deployed workloads on kubernets clusters");
        assert!(skills.contains("kubernetes"));
    }

    #[test]
    fn test_symbol_heavy_terms() {
        let skills = vocab().extract("Years of C++ and C# development");
        assert!(skills.contains("c++"));
        assert!(skills.contains("c#"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let v = vocab();
        let text = "Python, AWS, Docker, kubernets, machine learning";
        assert_eq!(v.extract(text), v.extract(text));
    }
}

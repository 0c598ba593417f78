//! Experience parsing from free text.
//!
//! Absence yields `None`, never zero: "unspecified" and "zero experience"
//! must stay distinguishable so experience filters never silently match
//! resumes that just don't mention a number.

use std::sync::OnceLock;

use regex::Regex;

/// Values at or above this are assumed to be noise (phone digits, years).
const MAX_PLAUSIBLE_YEARS: f64 = 40.0;

fn years_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})\s*\+?\s*(?:years?|yrs?)").unwrap())
}

/// Extracts stated years of experience, taking the largest plausible mention.
pub fn extract_experience_years(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    years_re()
        .captures_iter(&lower)
        .filter_map(|cap| cap[1].parse::<f64>().ok())
        .filter(|years| *years < MAX_PLAUSIBLE_YEARS)
        .fold(None, |max, years| match max {
            Some(m) if m >= years => Some(m),
            _ => Some(years),
        })
}

/// True when the text advertises an entry-level ("fresher") role.
pub fn mentions_fresher(text: &str) -> bool {
    text.to_lowercase().contains("fresher")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_years_pattern() {
        assert_eq!(
            extract_experience_years("Requires 5 years of backend work"),
            Some(5.0)
        );
    }

    #[test]
    fn test_plus_and_abbreviations() {
        assert_eq!(extract_experience_years("8+ yrs in data"), Some(8.0));
        assert_eq!(extract_experience_years("3+ years Python"), Some(3.0));
    }

    #[test]
    fn test_absence_is_none_not_zero() {
        assert_eq!(extract_experience_years("Seasoned engineer"), None);
    }

    #[test]
    fn test_multiple_mentions_take_max() {
        let text = "2 years of Java, then 6 years of Python";
        assert_eq!(extract_experience_years(text), Some(6.0));
    }

    #[test]
    fn test_implausible_values_ignored() {
        assert_eq!(extract_experience_years("founded 99 years ago"), None);
    }

    #[test]
    fn test_fresher_detection() {
        assert!(mentions_fresher("Openings for Freshers"));
        assert!(!mentions_fresher("Senior role"));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// JD lifecycle: `uploaded → matched → emailed`, no reversals.
/// Stored as lowercase text; transitions are guarded in SQL with
/// `UPDATE ... WHERE status = <from>` so they never run backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JdStatus {
    Uploaded,
    Matched,
    Emailed,
}

impl JdStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JdStatus::Uploaded => "uploaded",
            JdStatus::Matched => "matched",
            JdStatus::Emailed => "emailed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JdRow {
    pub id: Uuid,
    pub project_code: String,
    pub job_title: String,
    pub uploaded_by: String,
    pub file_key: String,
    pub extracted_text: String,
    pub skills: Vec<String>,
    /// NULL means the JD text states no requirement, distinct from zero.
    pub required_experience_years: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&JdStatus::Uploaded).unwrap(),
            r#""uploaded""#
        );
        assert_eq!(JdStatus::Matched.as_str(), "matched");
        assert_eq!(JdStatus::Emailed.as_str(), "emailed");
    }
}

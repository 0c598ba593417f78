use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Consultant profile. Re-uploading the same emp_id replaces the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub emp_id: String,
    pub name: String,
    pub email: String,
    pub vertical: String,
    pub skills: Vec<String>,
    /// NULL means the resume never states experience, distinct from zero.
    pub experience_years: Option<f64>,
    pub file_key: String,
    pub extracted_text: String,
    pub created_at: DateTime<Utc>,
}

/// Ad-hoc resume used for one-to-one and resume-to-JD matching.
/// A re-upload creates a new row with a new id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub name: String,
    pub file_key: String,
    pub extracted_text: String,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
    pub uploaded_at: DateTime<Utc>,
}

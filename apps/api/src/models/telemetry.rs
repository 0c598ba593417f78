#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One served match, appended per ranked result. MatchResult itself stays a
/// derived, recomputable value; these rows are the telemetry trail behind
/// the tracker, the PDF report, and the final-matches email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchRecordRow {
    pub id: Uuid,
    pub jd_id: Uuid,
    pub candidate_id: Uuid,
    /// "jd-to-resume" | "resume-to-jd" | "one-to-one"
    pub match_type: String,
    pub score: f64,
    pub label: String,
    pub latency_ms: i32,
    pub created_at: DateTime<Utc>,
}

/// Append-only recruiter vote. Multiple votes per (jd, resume, voter) all
/// persist; the current-vote view picks the latest.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeedbackVoteRow {
    pub id: Uuid,
    pub jd_id: Uuid,
    pub resume_id: Uuid,
    /// "up" | "down"
    pub vote: String,
    pub given_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailLogRow {
    pub id: Uuid,
    pub jd_id: Uuid,
    pub sent_to: String,
    pub cc: String,
    /// "sent" | "failed"
    pub status: String,
    pub attachment_keys: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AgentErrorRow {
    pub id: Uuid,
    pub error_type: String,
    pub message: String,
    pub method: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

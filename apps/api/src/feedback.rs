//! Recruiter feedback store.
//!
//! Append-only: every vote call inserts a new row, repeated votes from the
//! same recruiter included. The current-vote view picks the latest row per
//! voter. Feedback never mutates JD/resume/match rows and never feeds back
//! into scoring here; it is write-only telemetry for future tuning.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::telemetry::FeedbackVoteRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub jd_id: Uuid,
    pub resume_id: Uuid,
    pub vote: String,
    pub given_by: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentVotesResponse {
    pub votes: Vec<FeedbackVoteRow>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentVotesQuery {
    pub jd_id: Uuid,
    pub resume_id: Uuid,
}

/// POST /feedback
pub async fn handle_record_vote(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if req.vote != "up" && req.vote != "down" {
        return Err(AppError::Validation(format!(
            "Vote must be 'up' or 'down', got '{}'",
            req.vote
        )));
    }
    if req.given_by.trim().is_empty() {
        return Err(AppError::Validation("given_by must not be empty".to_string()));
    }

    sqlx::query(
        "INSERT INTO feedback_votes (id, jd_id, resume_id, vote, given_by) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(req.jd_id)
    .bind(req.resume_id)
    .bind(&req.vote)
    .bind(&req.given_by)
    .execute(&state.db)
    .await?;

    Ok(Json(json!({ "ack": true })))
}

/// GET /feedback/current
/// Latest vote per recruiter for one (jd, resume) pair.
pub async fn handle_current_votes(
    State(state): State<AppState>,
    Query(params): Query<CurrentVotesQuery>,
) -> Result<Json<CurrentVotesResponse>, AppError> {
    let votes: Vec<FeedbackVoteRow> = sqlx::query_as(
        r#"
        SELECT DISTINCT ON (given_by) *
        FROM feedback_votes
        WHERE jd_id = $1 AND resume_id = $2
        ORDER BY given_by, created_at DESC
        "#,
    )
    .bind(params.jd_id)
    .bind(params.resume_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(CurrentVotesResponse { votes }))
}

//! Usage/latency/error telemetry endpoints and the shared error logger.

use axum::{extract::State, Json};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::handlers::{
    MATCH_TYPE_JD_TO_RESUME, MATCH_TYPE_ONE_TO_ONE, MATCH_TYPE_RESUME_TO_JD,
};
use crate::state::AppState;

/// Appends a row to `agent_errors`. Best-effort: a failure to record a
/// failure is logged, not propagated.
pub async fn log_agent_error(pool: &PgPool, error_type: &str, message: &str, method: &str) {
    let outcome = sqlx::query(
        "INSERT INTO agent_errors (id, error_type, message, method) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(error_type)
    .bind(message)
    .bind(method)
    .execute(pool)
    .await;

    if let Err(e) = outcome {
        tracing::warn!("Failed to record agent error ({error_type} in {method}): {e}");
    }
}

#[derive(Debug, Serialize)]
pub struct LatencyStats {
    pub jd_to_resume: f64,
    pub resume_to_jd: f64,
    pub one_to_one: f64,
}

#[derive(Debug, Serialize)]
pub struct DailyUsage {
    pub date: String,
    pub matches: i64,
}

#[derive(Debug, Serialize)]
pub struct AgentHealthSummary {
    pub total_matches: i64,
    pub jd_to_resume: i64,
    pub resume_to_jd: i64,
    pub one_to_one: i64,
    pub latency_stats: LatencyStats,

    pub total_errors: i64,
    pub unresolved_errors: i64,
    pub resolved_errors: i64,
    pub most_common_error: String,
    pub most_common_error_count: i64,

    pub daily_usage: Vec<DailyUsage>,

    pub jd_uploaded: i64,
    pub resumes_uploaded: i64,
    pub avg_match_score: f64,
    pub match_success_rate: f64,
}

/// GET /tracker/agent-health
pub async fn handle_agent_health(
    State(state): State<AppState>,
) -> Result<Json<AgentHealthSummary>, AppError> {
    let pool = &state.db;

    let total_matches = count(pool, "SELECT COUNT(*) FROM match_records").await?;
    let jd_to_resume = count_by_type(pool, MATCH_TYPE_JD_TO_RESUME).await?;
    let resume_to_jd = count_by_type(pool, MATCH_TYPE_RESUME_TO_JD).await?;
    let one_to_one = count_by_type(pool, MATCH_TYPE_ONE_TO_ONE).await?;

    let latency_stats = LatencyStats {
        jd_to_resume: avg_latency(pool, MATCH_TYPE_JD_TO_RESUME).await?,
        resume_to_jd: avg_latency(pool, MATCH_TYPE_RESUME_TO_JD).await?,
        one_to_one: avg_latency(pool, MATCH_TYPE_ONE_TO_ONE).await?,
    };

    let total_errors = count(pool, "SELECT COUNT(*) FROM agent_errors").await?;
    let unresolved_errors = count(
        pool,
        "SELECT COUNT(*) FROM agent_errors WHERE resolved = FALSE",
    )
    .await?;

    let most_common: Option<(String, i64)> = sqlx::query_as(
        r#"
        SELECT error_type, COUNT(*) AS count
        FROM agent_errors
        GROUP BY error_type
        ORDER BY count DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;
    let (most_common_error, most_common_error_count) =
        most_common.unwrap_or_else(|| ("None".to_string(), 0));

    let daily_usage = daily_usage(pool).await?;

    let jd_uploaded = count(pool, "SELECT COUNT(*) FROM jds").await?;
    let resumes_uploaded = count(pool, "SELECT COUNT(*) FROM resumes").await?;

    let avg_match_score: Option<f64> =
        sqlx::query_scalar("SELECT AVG(score) FROM match_records")
            .fetch_one(pool)
            .await?;
    let avg_match_score = round2(avg_match_score.unwrap_or(0.0));

    let match_success_rate = if jd_uploaded > 0 {
        round2(total_matches as f64 / jd_uploaded as f64 * 100.0)
    } else {
        0.0
    };

    Ok(Json(AgentHealthSummary {
        total_matches,
        jd_to_resume,
        resume_to_jd,
        one_to_one,
        latency_stats,
        total_errors,
        unresolved_errors,
        resolved_errors: total_errors - unresolved_errors,
        most_common_error,
        most_common_error_count,
        daily_usage,
        jd_uploaded,
        resumes_uploaded,
        avg_match_score,
        match_success_rate,
    }))
}

#[derive(Debug, Serialize)]
pub struct RecruiterSummary {
    pub profiles: i64,
    pub jds: i64,
    pub matches: i64,
}

/// GET /recruiter/summary
pub async fn handle_recruiter_summary(
    State(state): State<AppState>,
) -> Result<Json<RecruiterSummary>, AppError> {
    Ok(Json(RecruiterSummary {
        profiles: count(&state.db, "SELECT COUNT(*) FROM profiles").await?,
        jds: count(&state.db, "SELECT COUNT(*) FROM jds").await?,
        matches: count(&state.db, "SELECT COUNT(*) FROM match_records").await?,
    }))
}

async fn count(pool: &PgPool, query: &str) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar(query).fetch_one(pool).await?)
}

async fn count_by_type(pool: &PgPool, match_type: &str) -> Result<i64, AppError> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(*) FROM match_records WHERE match_type = $1")
            .bind(match_type)
            .fetch_one(pool)
            .await?,
    )
}

async fn avg_latency(pool: &PgPool, match_type: &str) -> Result<f64, AppError> {
    let avg: Option<f64> =
        sqlx::query_scalar("SELECT AVG(latency_ms)::float8 FROM match_records WHERE match_type = $1")
            .bind(match_type)
            .fetch_one(pool)
            .await?;
    Ok(round2(avg.unwrap_or(0.0)))
}

/// Last 7 days of match counts, zero-filled for quiet days.
async fn daily_usage(pool: &PgPool) -> Result<Vec<DailyUsage>, AppError> {
    let counted: Vec<(NaiveDate, i64)> = sqlx::query_as(
        r#"
        SELECT created_at::date AS day, COUNT(*) AS matches
        FROM match_records
        WHERE created_at >= NOW() - INTERVAL '7 days'
        GROUP BY day
        "#,
    )
    .fetch_all(pool)
    .await?;

    let today = Utc::now().date_naive();
    let mut usage = Vec::with_capacity(7);
    for offset in (0..7i64).rev() {
        let day = today - Duration::days(offset);
        let matches = counted
            .iter()
            .find(|(d, _)| *d == day)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        usage.push(DailyUsage {
            date: day.format("%b %d").to_string(),
            matches,
        });
    }
    Ok(usage)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.123), 0.12);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(0.0), 0.0);
    }
}

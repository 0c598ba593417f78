use std::time::{Duration, Instant};

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::cache;
use crate::matching::ranking::{rank_top_matches, ScoredCandidate};
use crate::matching::scorer::{MatchDoc, MatchResult};
use crate::models::jd::{JdRow, JdStatus};
use crate::models::profile::{ProfileRow, ResumeRow};
use crate::state::AppState;
use crate::tracker::log_agent_error;

pub const MATCH_TYPE_JD_TO_RESUME: &str = "jd-to-resume";
pub const MATCH_TYPE_RESUME_TO_JD: &str = "resume-to-jd";
pub const MATCH_TYPE_ONE_TO_ONE: &str = "one-to-one";

#[derive(Debug, Deserialize)]
pub struct OneToOneRequest {
    pub jd_id: Uuid,
    pub resume_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct JdToResumesRequest {
    pub jd_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ResumeToJdsRequest {
    pub resume_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TopMatchesResponse<T> {
    pub top_matches: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct RankedProfileMatch {
    pub profile_id: Uuid,
    pub emp_id: String,
    pub name: String,
    pub vertical: String,
    pub score: f64,
    pub label: String,
    pub explanation: crate::matching::explain::Explanation,
}

#[derive(Debug, Serialize)]
pub struct RankedJdMatch {
    pub jd_id: Uuid,
    pub job_title: String,
    pub project_code: String,
    pub score: f64,
    pub label: String,
    pub explanation: crate::matching::explain::Explanation,
}

/// POST /match/one-to-one
pub async fn handle_one_to_one(
    State(state): State<AppState>,
    Json(req): Json<OneToOneRequest>,
) -> Result<Json<MatchResult>, AppError> {
    let started = Instant::now();

    let jd = load_jd(&state.db, req.jd_id).await?;
    let resume: Option<ResumeRow> = sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
        .bind(req.resume_id)
        .fetch_optional(&state.db)
        .await?;
    let resume = resume.ok_or_else(|| AppError::NotFound(format!("Resume {} not found", req.resume_id)))?;

    let jd_doc = MatchDoc::from_jd(&jd);
    let resume_doc = MatchDoc::from_resume(&resume);

    let result = match score_with_cache(&state, &jd_doc, &resume_doc).await {
        Ok(result) => result,
        Err(e) => {
            log_agent_error(&state.db, e.error_type(), &e.to_string(), "match/one-to-one").await;
            return Err(e);
        }
    };

    record_match(
        &state.db,
        jd.id,
        resume.id,
        MATCH_TYPE_ONE_TO_ONE,
        &result,
        started.elapsed(),
    )
    .await?;

    Ok(Json(result))
}

/// POST /match/jd-to-resumes
///
/// Ranks the consultant profile corpus for one JD. A non-empty result
/// transitions the JD `uploaded → matched`; an empty pool yields
/// `top_matches: []` and leaves the lifecycle alone.
pub async fn handle_jd_to_resumes(
    State(state): State<AppState>,
    Json(req): Json<JdToResumesRequest>,
) -> Result<Json<TopMatchesResponse<RankedProfileMatch>>, AppError> {
    let started = Instant::now();

    let jd = load_jd(&state.db, req.jd_id).await?;
    let jd_doc = MatchDoc::from_jd(&jd);

    let profiles: Vec<ProfileRow> = sqlx::query_as("SELECT * FROM profiles ORDER BY id")
        .fetch_all(&state.db)
        .await?;

    let mut scored = Vec::with_capacity(profiles.len());
    for profile in &profiles {
        let candidate = MatchDoc::from_profile(profile);
        let result = match score_with_cache(&state, &jd_doc, &candidate).await {
            Ok(result) => result,
            Err(e) => {
                log_agent_error(&state.db, e.error_type(), &e.to_string(), "match/jd-to-resumes")
                    .await;
                return Err(e);
            }
        };
        scored.push(ScoredCandidate {
            id: profile.id,
            result,
        });
    }

    let ranked = rank_top_matches(scored);
    if !ranked.is_empty() {
        transition_jd(&state.db, jd.id, JdStatus::Uploaded, JdStatus::Matched).await?;
    }

    let elapsed = started.elapsed();
    let mut top_matches = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        record_match(
            &state.db,
            jd.id,
            candidate.id,
            MATCH_TYPE_JD_TO_RESUME,
            &candidate.result,
            elapsed,
        )
        .await?;

        // Ranked ids come from the pool loaded above
        let profile = profiles
            .iter()
            .find(|p| p.id == candidate.id)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Ranked unknown profile id")))?;
        top_matches.push(RankedProfileMatch {
            profile_id: profile.id,
            emp_id: profile.emp_id.clone(),
            name: profile.name.clone(),
            vertical: profile.vertical.clone(),
            score: candidate.result.score,
            label: candidate.result.label.clone(),
            explanation: candidate.result.explanation.clone(),
        });
    }

    Ok(Json(TopMatchesResponse { top_matches }))
}

/// POST /match/resume-to-jds
///
/// The reverse direction, deduplicated server-side like the forward one;
/// callers never need to filter repeated JDs out of the response.
pub async fn handle_resume_to_jds(
    State(state): State<AppState>,
    Json(req): Json<ResumeToJdsRequest>,
) -> Result<Json<TopMatchesResponse<RankedJdMatch>>, AppError> {
    let started = Instant::now();

    let resume: Option<ResumeRow> = sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
        .bind(req.resume_id)
        .fetch_optional(&state.db)
        .await?;
    let resume = resume.ok_or_else(|| AppError::NotFound(format!("Resume {} not found", req.resume_id)))?;
    let resume_doc = MatchDoc::from_resume(&resume);

    let jds: Vec<JdRow> = sqlx::query_as("SELECT * FROM jds ORDER BY id")
        .fetch_all(&state.db)
        .await?;

    let mut scored = Vec::with_capacity(jds.len());
    for jd in &jds {
        let jd_doc = MatchDoc::from_jd(jd);
        let result = match score_with_cache(&state, &jd_doc, &resume_doc).await {
            Ok(result) => result,
            Err(e) => {
                log_agent_error(&state.db, e.error_type(), &e.to_string(), "match/resume-to-jds")
                    .await;
                return Err(e);
            }
        };
        scored.push(ScoredCandidate { id: jd.id, result });
    }

    let ranked = rank_top_matches(scored);
    let elapsed = started.elapsed();
    let mut top_matches = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        record_match(
            &state.db,
            candidate.id,
            resume.id,
            MATCH_TYPE_RESUME_TO_JD,
            &candidate.result,
            elapsed,
        )
        .await?;

        let jd = jds
            .iter()
            .find(|j| j.id == candidate.id)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Ranked unknown JD id")))?;
        top_matches.push(RankedJdMatch {
            jd_id: jd.id,
            job_title: jd.job_title.clone(),
            project_code: jd.project_code.clone(),
            score: candidate.result.score,
            label: candidate.result.label.clone(),
            explanation: candidate.result.explanation.clone(),
        });
    }

    Ok(Json(TopMatchesResponse { top_matches }))
}

// ────────────────────────────────────────────────────────────────────────────
// Shared plumbing
// ────────────────────────────────────────────────────────────────────────────

async fn load_jd(pool: &PgPool, jd_id: Uuid) -> Result<JdRow, AppError> {
    let jd: Option<JdRow> = sqlx::query_as("SELECT * FROM jds WHERE id = $1")
        .bind(jd_id)
        .fetch_optional(pool)
        .await?;
    jd.ok_or_else(|| AppError::NotFound(format!("JD {jd_id} not found")))
}

/// Scores one pair: advisory cache first, then the scorer under the
/// configured timeout.
async fn score_with_cache(
    state: &AppState,
    jd: &MatchDoc,
    candidate: &MatchDoc,
) -> Result<MatchResult, AppError> {
    let key = cache::cache_key(jd.id, candidate.id, &jd.text, &candidate.text);
    if let Some(hit) = cache::get_cached(&state.redis, &key).await {
        return Ok(hit);
    }

    let bound = Duration::from_secs(state.config.score_timeout_secs);
    let result = tokio::time::timeout(bound, state.scorer.score(jd, candidate))
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "Scoring exceeded {}s for pair ({}, {})",
                state.config.score_timeout_secs, jd.id, candidate.id
            ))
        })??;

    cache::put_cached(&state.redis, &key, &result).await;
    Ok(result)
}

async fn record_match(
    pool: &PgPool,
    jd_id: Uuid,
    candidate_id: Uuid,
    match_type: &str,
    result: &MatchResult,
    latency: Duration,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO match_records (id, jd_id, candidate_id, match_type, score, label, latency_ms)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(jd_id)
    .bind(candidate_id)
    .bind(match_type)
    .bind(result.score)
    .bind(&result.label)
    .bind(latency.as_millis() as i32)
    .execute(pool)
    .await?;
    Ok(())
}

/// Guarded lifecycle transition; a no-op when the JD is not in `from`.
pub async fn transition_jd(
    pool: &PgPool,
    jd_id: Uuid,
    from: JdStatus,
    to: JdStatus,
) -> Result<bool, AppError> {
    let updated = sqlx::query("UPDATE jds SET status = $1 WHERE id = $2 AND status = $3")
        .bind(to.as_str())
        .bind(jd_id)
        .bind(from.as_str())
        .execute(pool)
        .await?;
    Ok(updated.rows_affected() > 0)
}

use std::collections::HashMap;

use aws_sdk_s3::primitives::ByteStream;
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::experience::{extract_experience_years, mentions_fresher};
use crate::ingest::extract::extract_document_with_timeout;
use crate::models::jd::{JdRow, JdStatus};
use crate::models::profile::ProfileRow;
use crate::state::AppState;
use crate::tracker::log_agent_error;

// ────────────────────────────────────────────────────────────────────────────
// Multipart plumbing
// ────────────────────────────────────────────────────────────────────────────

struct UploadForm {
    file: Option<(String, Bytes)>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    fn field_or(&self, name: &str, default: &str) -> String {
        self.field(name).unwrap_or(default).to_string()
    }
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        file: None,
        fields: HashMap::new(),
    };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("upload.txt").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            form.file = Some((filename, bytes));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}

/// Extracts text with the configured timeout, recording any failure before
/// surfacing it. Parse failures create no record at all.
async fn extract_or_log(
    state: &AppState,
    bytes: &Bytes,
    filename: &str,
    method: &str,
) -> Result<String, AppError> {
    match extract_document_with_timeout(
        bytes.to_vec(),
        filename.to_string(),
        state.config.extract_timeout_secs,
    )
    .await
    {
        Ok(text) => Ok(text),
        Err(e) => {
            log_agent_error(&state.db, e.error_type(), &e.to_string(), method).await;
            Err(e)
        }
    }
}

async fn store_raw_file(state: &AppState, key: &str, bytes: Bytes) -> Result<(), AppError> {
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(key)
        .body(ByteStream::from(bytes.to_vec()))
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("Failed to store '{key}': {e}")))?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Uploads
// ────────────────────────────────────────────────────────────────────────────

/// POST /upload-jd
pub async fn handle_upload_jd(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut form = read_form(multipart).await?;
    let (filename, bytes) = form
        .file
        .take()
        .ok_or_else(|| AppError::Validation("No JD file provided".to_string()))?;

    let uploaded_by = form.field_or("uploaded_by", "anonymous");
    let project_code = form.field_or("project_code", "GENERIC");
    let job_title = form.field_or("job_title", "Untitled");

    let text = extract_or_log(&state, &bytes, &filename, "upload-jd").await?;
    let skills: Vec<String> = state.vocab.extract(&text).into_iter().collect();
    let required_experience = extract_experience_years(&text);

    let id = Uuid::new_v4();
    let file_key = format!("jds/{id}/{filename}");
    store_raw_file(&state, &file_key, bytes).await?;

    sqlx::query(
        r#"
        INSERT INTO jds
            (id, project_code, job_title, uploaded_by, file_key, extracted_text,
             skills, required_experience_years, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(&project_code)
    .bind(&job_title)
    .bind(&uploaded_by)
    .bind(&file_key)
    .bind(&text)
    .bind(&skills)
    .bind(required_experience)
    .bind(JdStatus::Uploaded.as_str())
    .execute(&state.db)
    .await?;

    tracing::info!("Ingested JD {id} ({job_title})");
    Ok(Json(json!({
        "message": "JD uploaded",
        "jd_id": id,
        "job_title": job_title
    })))
}

/// POST /upload-resume
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut form = read_form(multipart).await?;
    let (filename, bytes) = form
        .file
        .take()
        .ok_or_else(|| AppError::Validation("No resume provided".to_string()))?;
    let name = form.field_or("name", &filename);

    let text = extract_or_log(&state, &bytes, &filename, "upload-resume").await?;
    let skills: Vec<String> = state.vocab.extract(&text).into_iter().collect();
    let experience_years = extract_experience_years(&text);

    let id = Uuid::new_v4();
    let file_key = format!("resumes/{id}/{filename}");
    store_raw_file(&state, &file_key, bytes).await?;

    sqlx::query(
        r#"
        INSERT INTO resumes (id, name, file_key, extracted_text, skills, experience_years)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(&name)
    .bind(&file_key)
    .bind(&text)
    .bind(&skills)
    .bind(experience_years)
    .execute(&state.db)
    .await?;

    tracing::info!("Ingested resume {id} ({name})");
    Ok(Json(json!({
        "message": "Resume uploaded",
        "resume_id": id
    })))
}

/// POST /upload-profile
///
/// Consultant profiles are keyed by emp_id: a re-upload replaces the
/// existing row. Manual skills/experience fields override extraction.
pub async fn handle_upload_profile(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let form = read_form(multipart).await?;
    let (filename, bytes) = form
        .file
        .clone()
        .ok_or_else(|| AppError::Validation("Missing emp_id, name, email or file".to_string()))?;
    if form.field("emp_id").is_none() || form.field("name").is_none() || form.field("email").is_none()
    {
        return Err(AppError::Validation(
            "Missing emp_id, name, email or file".to_string(),
        ));
    }
    let emp_id = form.field_or("emp_id", "");
    let name = form.field_or("name", "");
    let email = form.field_or("email", "");
    let vertical = form.field_or("vertical", "N/A");

    let text = extract_or_log(&state, &bytes, &filename, "upload-profile").await?;

    let skills: Vec<String> = match form.field("skills") {
        Some(manual) => manual
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        None => state.vocab.extract(&text).into_iter().collect(),
    };

    let experience_years = form
        .field("experience_years")
        .and_then(|v| v.trim().parse::<f64>().ok())
        .or_else(|| extract_experience_years(&text));

    let id = Uuid::new_v4();
    let file_key = format!("profiles/{id}/{filename}");
    store_raw_file(&state, &file_key, bytes).await?;

    let mut tx = state.db.begin().await?;
    sqlx::query("DELETE FROM profiles WHERE emp_id = $1")
        .bind(&emp_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO profiles
            (id, emp_id, name, email, vertical, skills, experience_years, file_key, extracted_text)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(&emp_id)
    .bind(&name)
    .bind(&email)
    .bind(&vertical)
    .bind(&skills)
    .bind(experience_years)
    .bind(&file_key)
    .bind(&text)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!("Ingested profile {id} (emp {emp_id})");
    Ok(Json(json!({
        "message": "Profile uploaded",
        "profile_id": id
    })))
}

// ────────────────────────────────────────────────────────────────────────────
// Listings & search
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct JdListItem {
    pub id: Uuid,
    pub job_title: String,
    pub project_code: String,
    pub uploaded_by: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// GET /jds
pub async fn handle_list_jds(
    State(state): State<AppState>,
) -> Result<Json<Vec<JdListItem>>, AppError> {
    let jds: Vec<JdRow> = sqlx::query_as("SELECT * FROM jds ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(
        jds.into_iter()
            .map(|jd| JdListItem {
                id: jd.id,
                job_title: jd.job_title,
                project_code: jd.project_code,
                uploaded_by: jd.uploaded_by,
                status: jd.status,
                created_at: jd.created_at,
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
pub struct FilterableJd {
    pub id: Uuid,
    pub job_title: String,
    pub uploaded_by: String,
    pub project_code: String,
    pub skills: Vec<String>,
    pub experience: f64,
    pub status: String,
    pub created_at: String,
}

/// GET /jds/filterable
///
/// The shape the dashboard filter bar consumes: cleaned skills (≤10) and a
/// concrete experience number ("fresher" counts as 0; a JD that states
/// nothing gets the configured fallback for display only).
pub async fn handle_list_jds_filterable(
    State(state): State<AppState>,
) -> Result<Json<Vec<FilterableJd>>, AppError> {
    let jds: Vec<JdRow> = sqlx::query_as("SELECT * FROM jds ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    let items = jds
        .into_iter()
        .map(|jd| {
            let skills: Vec<String> = jd
                .skills
                .iter()
                .filter(|s| s.len() > 2 && s.chars().all(|c| c.is_ascii_alphanumeric()))
                .take(10)
                .cloned()
                .collect();

            let experience = jd
                .required_experience_years
                .or_else(|| mentions_fresher(&jd.extracted_text).then_some(0.0))
                .unwrap_or(state.config.default_jd_experience);

            FilterableJd {
                id: jd.id,
                job_title: jd.job_title,
                uploaded_by: jd.uploaded_by,
                project_code: jd.project_code,
                skills,
                experience,
                status: jd.status,
                created_at: jd.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            }
        })
        .collect();

    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
pub struct ProfileSearchQuery {
    pub emp_id: Option<String>,
    pub name: Option<String>,
    pub vertical: Option<String>,
    /// Comma-separated; every listed skill must be present.
    pub skills: Option<String>,
    pub min_exp: Option<f64>,
    pub max_exp: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ProfileSearchItem {
    pub id: Uuid,
    pub emp_id: String,
    pub name: String,
    pub vertical: String,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
}

/// GET /profiles/search
///
/// Experience bounds only match rows that actually state a number;
/// unspecified experience never silently satisfies `experience >= N`.
pub async fn handle_search_profiles(
    State(state): State<AppState>,
    Query(params): Query<ProfileSearchQuery>,
) -> Result<Json<Vec<ProfileSearchItem>>, AppError> {
    let skill_filter: Option<Vec<String>> = params.skills.as_deref().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    });
    let skill_filter = skill_filter.filter(|list: &Vec<String>| !list.is_empty());

    let profiles: Vec<ProfileRow> = sqlx::query_as(
        r#"
        SELECT * FROM profiles
        WHERE ($1::text IS NULL OR emp_id ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
          AND ($3::text IS NULL OR vertical ILIKE '%' || $3 || '%')
          AND ($4::text[] IS NULL OR skills @> $4)
          AND ($5::float8 IS NULL OR (experience_years IS NOT NULL AND experience_years >= $5))
          AND ($6::float8 IS NULL OR (experience_years IS NOT NULL AND experience_years <= $6))
        ORDER BY created_at DESC
        "#,
    )
    .bind(&params.emp_id)
    .bind(&params.name)
    .bind(&params.vertical)
    .bind(&skill_filter)
    .bind(params.min_exp)
    .bind(params.max_exp)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(
        profiles
            .into_iter()
            .map(|p| ProfileSearchItem {
                id: p.id,
                emp_id: p.emp_id,
                name: p.name,
                vertical: p.vertical,
                skills: p.skills,
                experience_years: p.experience_years,
            })
            .collect(),
    ))
}

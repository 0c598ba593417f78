//! PDF report of the top matches recorded for a JD.

use aws_sdk_s3::primitives::ByteStream;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::handlers::MATCH_TYPE_JD_TO_RESUME;
use crate::models::jd::JdRow;
use crate::state::AppState;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;

#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub name: String,
    pub emp_id: String,
    pub score: f64,
}

/// Top-3 deduplicated profile matches recorded for a JD, latest record per
/// profile, ordered (score desc, id asc).
pub async fn top_matches_for_jd(pool: &PgPool, jd_id: Uuid) -> Result<Vec<ReportEntry>, AppError> {
    let rows: Vec<(String, String, f64)> = sqlx::query_as(
        r#"
        SELECT p.name, p.emp_id, m.score
        FROM (
            SELECT DISTINCT ON (candidate_id) candidate_id, score
            FROM match_records
            WHERE jd_id = $1 AND match_type = $2
            ORDER BY candidate_id, created_at DESC
        ) m
        JOIN profiles p ON p.id = m.candidate_id
        ORDER BY m.score DESC, m.candidate_id ASC
        LIMIT 3
        "#,
    )
    .bind(jd_id)
    .bind(MATCH_TYPE_JD_TO_RESUME)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(name, emp_id, score)| ReportEntry {
            name,
            emp_id,
            score,
        })
        .collect())
}

/// Renders a one-page report. Pure and deterministic apart from the
/// library's internal document ids.
pub fn render_pdf(jd: &JdRow, entries: &[ReportEntry]) -> Result<Vec<u8>, AppError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Top Matches - {}", jd.job_title),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF font error: {e}")))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF font error: {e}")))?;

    let current = doc.get_page(page).get_layer(layer);
    let mut y = 270.0;

    current.use_text(
        format!("Top Matches - {}", jd.job_title),
        18.0,
        Mm(20.0),
        Mm(y),
        &bold,
    );
    y -= 10.0;
    current.use_text(
        format!("Project: {}  |  JD: {}", jd.project_code, jd.id),
        10.0,
        Mm(20.0),
        Mm(y),
        &regular,
    );
    y -= 15.0;

    for (rank, entry) in entries.iter().enumerate() {
        current.use_text(
            format!(
                "{}. {} ({})  -  {:.2}%",
                rank + 1,
                entry.name,
                entry.emp_id,
                entry.score * 100.0
            ),
            12.0,
            Mm(20.0),
            Mm(y),
            &regular,
        );
        y -= 8.0;
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF serialization error: {e}")))
}

/// GET /generate-pdf/:jd_id
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    Path(jd_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let jd: Option<JdRow> = sqlx::query_as("SELECT * FROM jds WHERE id = $1")
        .bind(jd_id)
        .fetch_optional(&state.db)
        .await?;
    let jd = jd.ok_or_else(|| AppError::NotFound(format!("JD {jd_id} not found")))?;

    let entries = top_matches_for_jd(&state.db, jd_id).await?;
    if entries.is_empty() {
        return Err(AppError::NotFound(format!(
            "No matches recorded for JD {jd_id}"
        )));
    }

    let bytes = render_pdf(&jd, &entries)?;

    // Archive a copy; the download itself must not depend on it
    let report_key = format!("reports/{jd_id}.pdf");
    if let Err(e) = state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&report_key)
        .body(ByteStream::from(bytes.clone()))
        .content_type("application/pdf")
        .send()
        .await
    {
        tracing::warn!("Failed to archive report {report_key}: {e}");
    }

    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn jd() -> JdRow {
        JdRow {
            id: Uuid::from_u128(42),
            project_code: "PRJ-9".to_string(),
            job_title: "Data Engineer".to_string(),
            uploaded_by: "ar@example.com".to_string(),
            file_key: "jds/42/jd.pdf".to_string(),
            extracted_text: "Data Engineer JD".to_string(),
            skills: vec!["python".to_string()],
            required_experience_years: Some(3.0),
            status: "matched".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_pdf_produces_pdf_bytes() {
        let entries = vec![
            ReportEntry {
                name: "Jane Doe".to_string(),
                emp_id: "E-100".to_string(),
                score: 0.87,
            },
            ReportEntry {
                name: "John Roe".to_string(),
                emp_id: "E-200".to_string(),
                score: 0.61,
            },
        ];
        let bytes = render_pdf(&jd(), &entries).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_pdf_handles_empty_entries() {
        let bytes = render_pdf(&jd(), &[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}

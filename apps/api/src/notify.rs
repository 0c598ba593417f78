//! Email dispatch for match results.
//!
//! SMTP sends go through a blocking task; the handler awaits the outcome
//! because the JD lifecycle transition `matched → emailed` requires a
//! positive acknowledgment, and every attempt lands in `email_log`.

use axum::{extract::State, Json};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::matching::handlers::transition_jd;
use crate::models::jd::{JdRow, JdStatus};
use crate::report::{render_pdf, top_matches_for_jd};
use crate::state::AppState;
use crate::tracker::log_agent_error;

pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
pub struct ManualEmailRequest {
    pub jd_id: Uuid,
    pub to_email: String,
    #[serde(default)]
    pub cc_list: Vec<String>,
    pub attachment_keys: Vec<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

fn default_subject() -> String {
    "Top Matches".to_string()
}

#[derive(Debug, Deserialize)]
pub struct FinalMatchesEmailRequest {
    pub jd_id: Uuid,
    pub to_email: String,
    #[serde(default)]
    pub cc_list: Vec<String>,
}

/// POST /send-email/manual
pub async fn handle_send_manual(
    State(state): State<AppState>,
    Json(req): Json<ManualEmailRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if req.to_email.trim().is_empty() {
        return Err(AppError::Validation("to_email is required".to_string()));
    }
    if req.attachment_keys.is_empty() {
        return Err(AppError::Validation(
            "At least one attachment is required".to_string(),
        ));
    }
    let jd = load_jd(&state.db, req.jd_id).await?;

    let mut attachments = Vec::with_capacity(req.attachment_keys.len());
    for key in &req.attachment_keys {
        attachments.push(fetch_attachment(&state, key).await?);
    }

    let outcome = dispatch(
        &state.config,
        &req.to_email,
        &req.cc_list,
        &req.subject,
        &req.body,
        attachments,
    )
    .await;

    log_email(
        &state.db,
        jd.id,
        &req.to_email,
        &req.cc_list,
        &outcome,
        &req.attachment_keys,
    )
    .await;

    if let Err(e) = outcome {
        log_agent_error(&state.db, e.error_type(), &e.to_string(), "send-email/manual").await;
        return Err(e);
    }
    Ok(Json(json!({ "message": "Email sent" })))
}

/// POST /send-email/matches-final
///
/// Sends the recorded top matches for a JD with the PDF report attached.
/// Success is the acknowledgment that moves the JD `matched → emailed`.
pub async fn handle_send_final(
    State(state): State<AppState>,
    Json(req): Json<FinalMatchesEmailRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if req.to_email.trim().is_empty() {
        return Err(AppError::Validation("to_email is required".to_string()));
    }
    let jd = load_jd(&state.db, req.jd_id).await?;

    let entries = top_matches_for_jd(&state.db, jd.id).await?;
    if entries.is_empty() {
        return Err(AppError::Validation(format!(
            "JD {} has no recorded matches to email",
            jd.id
        )));
    }

    let mut body = format!("Top matches for {} ({}):\n\n", jd.job_title, jd.project_code);
    for (rank, entry) in entries.iter().enumerate() {
        body.push_str(&format!(
            "{}. {} ({}) - {:.2}%\n",
            rank + 1,
            entry.name,
            entry.emp_id,
            entry.score * 100.0
        ));
    }

    let report_key = format!("reports/{}.pdf", jd.id);
    let pdf = render_pdf(&jd, &entries)?;
    let attachments = vec![EmailAttachment {
        filename: format!("top-matches-{}.pdf", jd.id),
        content_type: "application/pdf".to_string(),
        bytes: pdf,
    }];

    let subject = format!("Final Matches: {}", jd.job_title);
    let outcome = dispatch(
        &state.config,
        &req.to_email,
        &req.cc_list,
        &subject,
        &body,
        attachments,
    )
    .await;

    log_email(
        &state.db,
        jd.id,
        &req.to_email,
        &req.cc_list,
        &outcome,
        std::slice::from_ref(&report_key),
    )
    .await;

    match outcome {
        Ok(()) => {
            let transitioned =
                transition_jd(&state.db, jd.id, JdStatus::Matched, JdStatus::Emailed).await?;
            Ok(Json(json!({ "message": "Email sent", "emailed": transitioned })))
        }
        Err(e) => {
            log_agent_error(
                &state.db,
                e.error_type(),
                &e.to_string(),
                "send-email/matches-final",
            )
            .await;
            Err(e)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dispatch plumbing
// ────────────────────────────────────────────────────────────────────────────

async fn dispatch(
    config: &Config,
    to: &str,
    cc_list: &[String],
    subject: &str,
    body: &str,
    attachments: Vec<EmailAttachment>,
) -> Result<(), AppError> {
    let message = build_message(config, to, cc_list, subject, body, attachments)?;

    let server = config.smtp_server.clone();
    let user = config.smtp_user.clone();
    let pass = config.smtp_pass.clone();

    let sent = tokio::task::spawn_blocking(move || {
        let credentials = Credentials::new(user, pass);
        let mailer = SmtpTransport::relay(&server)
            .map_err(|e| e.to_string())?
            .credentials(credentials)
            .build();
        mailer.send(&message).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("{e}")))?;

    sent.map(|_| ())
        .map_err(|e| AppError::Dependency(format!("Email dispatch failed: {e}")))
}

fn build_message(
    config: &Config,
    to: &str,
    cc_list: &[String],
    subject: &str,
    body: &str,
    attachments: Vec<EmailAttachment>,
) -> Result<Message, AppError> {
    let from: Mailbox = config
        .from_email
        .parse()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("FROM_EMAIL is not a valid mailbox")))?;
    let to: Mailbox = to
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid recipient address '{to}'")))?;

    let mut builder = Message::builder().from(from).to(to).subject(subject);
    for cc in cc_list {
        let cc: Mailbox = cc
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid cc address '{cc}'")))?;
        builder = builder.cc(cc);
    }

    let mut multipart = MultiPart::mixed().singlepart(
        SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string()),
    );
    for attachment in attachments {
        let content_type = ContentType::parse(&attachment.content_type)
            .unwrap_or(ContentType::TEXT_PLAIN);
        multipart = multipart.singlepart(
            Attachment::new(attachment.filename).body(attachment.bytes, content_type),
        );
    }

    builder
        .multipart(multipart)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build email: {e}")))
}

async fn fetch_attachment(state: &AppState, key: &str) -> Result<EmailAttachment, AppError> {
    let object = state
        .s3
        .get_object()
        .bucket(&state.config.s3_bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::Dependency(format!("Failed to fetch attachment '{key}': {e}")))?;

    let bytes = object
        .body
        .collect()
        .await
        .map_err(|e| AppError::Dependency(format!("Failed to read attachment '{key}': {e}")))?
        .into_bytes()
        .to_vec();

    let filename = key.rsplit('/').next().unwrap_or(key).to_string();
    let content_type = if filename.to_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    };

    Ok(EmailAttachment {
        filename,
        content_type: content_type.to_string(),
        bytes,
    })
}

async fn load_jd(pool: &PgPool, jd_id: Uuid) -> Result<JdRow, AppError> {
    let jd: Option<JdRow> = sqlx::query_as("SELECT * FROM jds WHERE id = $1")
        .bind(jd_id)
        .fetch_optional(pool)
        .await?;
    jd.ok_or_else(|| AppError::NotFound(format!("JD {jd_id} not found")))
}

async fn log_email(
    pool: &PgPool,
    jd_id: Uuid,
    to: &str,
    cc_list: &[String],
    outcome: &Result<(), AppError>,
    attachment_keys: &[String],
) {
    let status = if outcome.is_ok() { "sent" } else { "failed" };
    let logged = sqlx::query(
        r#"
        INSERT INTO email_log (id, jd_id, sent_to, cc, status, attachment_keys)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(jd_id)
    .bind(to)
    .bind(cc_list.join(", "))
    .bind(status)
    .bind(attachment_keys)
    .execute(pool)
    .await;

    if let Err(e) = logged {
        tracing::warn!("Failed to record email log for JD {jd_id}: {e}");
    }
}

pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::feedback;
use crate::ingest;
use crate::matching;
use crate::notify;
use crate::report;
use crate::state::AppState;
use crate::tracker;

pub fn build_router(state: AppState) -> Router {
    // Every state-changing endpoint sits behind bearer-token validation;
    // reads stay open (role gating happens in the UI).
    let protected = Router::new()
        .route("/upload-jd", post(ingest::handlers::handle_upload_jd))
        .route("/upload-resume", post(ingest::handlers::handle_upload_resume))
        .route("/upload-profile", post(ingest::handlers::handle_upload_profile))
        .route("/match/one-to-one", post(matching::handlers::handle_one_to_one))
        .route(
            "/match/jd-to-resumes",
            post(matching::handlers::handle_jd_to_resumes),
        )
        .route(
            "/match/resume-to-jds",
            post(matching::handlers::handle_resume_to_jds),
        )
        .route("/feedback", post(feedback::handle_record_vote))
        .route("/send-email/manual", post(notify::handle_send_manual))
        .route("/send-email/matches-final", post(notify::handle_send_final))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/login", post(auth::handle_login))
        .route("/jds", get(ingest::handlers::handle_list_jds))
        .route(
            "/jds/filterable",
            get(ingest::handlers::handle_list_jds_filterable),
        )
        .route("/profiles/search", get(ingest::handlers::handle_search_profiles))
        .route("/feedback/current", get(feedback::handle_current_votes))
        .route("/generate-pdf/:jd_id", get(report::handle_generate_pdf))
        .route("/tracker/agent-health", get(tracker::handle_agent_health))
        .route("/recruiter/summary", get(tracker::handle_recruiter_summary))
        .merge(protected)
        .with_state(state)
}

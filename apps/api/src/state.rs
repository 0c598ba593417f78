use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::ingest::skills::SkillVocabulary;
use crate::matching::scorer::MatchScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Advisory match-result cache. Keys embed content fingerprints, so a
    /// JD/resume mutation can never serve a stale entry.
    pub redis: RedisClient,
    pub s3: S3Client,
    pub config: Config,
    /// Pluggable scorer. Default: WeightedScorer with configured weights.
    pub scorer: Arc<dyn MatchScorer>,
    /// Controlled skill vocabulary shared by ingestion and explanation.
    pub vocab: Arc<SkillVocabulary>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// sha256 hex digest of the password.
    #[serde(skip_serializing)]
    pub password_digest: String,
    /// "ar" | "recruiter"; carried into the token's role claim.
    pub role: String,
    pub created_at: DateTime<Utc>,
}

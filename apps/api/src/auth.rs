//! Bearer-token auth: sha256 password digests, HS256 JWTs with a role
//! claim, and an Axum middleware guarding every state-changing endpoint.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User email.
    pub sub: String,
    /// "ar" | "recruiter"; the UI gates routes on this claim.
    pub role: String,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
}

/// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or(AppError::Unauthorized)?;
    if user.password_digest != password_digest(&req.password) {
        return Err(AppError::Unauthorized);
    }

    let token = issue_token(&state.config.jwt_secret, &user.email, &user.role)?;
    Ok(Json(LoginResponse {
        token,
        role: user.role,
    }))
}

/// Middleware for state-changing routes. Inserts the verified `Claims`
/// into request extensions for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;
    let claims = verify_token(&state.config.jwt_secret, token)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

pub fn issue_token(secret: &str, email: &str, role: &str) -> Result<String, AppError> {
    let exp = Utc::now()
        .checked_add_signed(chrono::Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Token expiry overflow")))?
        .timestamp();

    let claims = Claims {
        sub: email.to_string(),
        role: role.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {e}")))
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

pub fn password_digest(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_roundtrip_preserves_claims() {
        let token = issue_token(SECRET, "rec@example.com", "recruiter").unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "rec@example.com");
        assert_eq!(claims.role, "recruiter");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(SECRET, "ar@example.com", "ar").unwrap();
        assert!(matches!(
            verify_token("other-secret", &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            verify_token(SECRET, "not.a.jwt"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims {
            sub: "old@example.com".to_string(),
            role: "ar".to_string(),
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            verify_token(SECRET, &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_password_digest_is_stable_hex() {
        let digest = password_digest("hunter2");
        assert_eq!(digest, password_digest("hunter2"));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub jwt_secret: String,
    pub smtp_server: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub from_email: String,
    pub port: u16,
    pub rust_log: String,

    /// Scoring weights; must sum to 1.0. Documented in DESIGN.md; these are
    /// configuration, not constants.
    pub skill_weight: f64,
    pub experience_weight: f64,
    pub semantic_weight: f64,
    /// Additive bump when the JD's business vertical also appears in the
    /// candidate text. Applied before clamping.
    pub domain_boost: f64,

    /// Bound on document text extraction (PDF parsing is the slow path).
    pub extract_timeout_secs: u64,
    /// Bound on a single pair scoring call.
    pub score_timeout_secs: u64,
    /// Experience shown for a JD whose text states no requirement
    /// (dashboard filter fallback only; scoring treats it as unspecified).
    pub default_jd_experience: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            jwt_secret: require_env("JWT_SECRET")?,
            smtp_server: require_env("SMTP_SERVER")?,
            smtp_user: require_env("SMTP_USER")?,
            smtp_pass: require_env("SMTP_PASS")?,
            from_email: require_env("FROM_EMAIL")?,
            port: env_or("PORT", "8080")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            skill_weight: env_or("SKILL_WEIGHT", "0.4")?,
            experience_weight: env_or("EXPERIENCE_WEIGHT", "0.2")?,
            semantic_weight: env_or("SEMANTIC_WEIGHT", "0.4")?,
            domain_boost: env_or("DOMAIN_BOOST", "0.05")?,
            extract_timeout_secs: env_or("EXTRACT_TIMEOUT_SECS", "20")?,
            score_timeout_secs: env_or("SCORE_TIMEOUT_SECS", "10")?,
            default_jd_experience: env_or("DEFAULT_JD_EXPERIENCE", "3")?,
        };

        let weight_sum = config.skill_weight + config.experience_weight + config.semantic_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            bail!("Scoring weights must sum to 1.0, got {weight_sum}");
        }

        Ok(config)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T: std::str::FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value"))
}

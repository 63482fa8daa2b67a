use serde::Deserialize;

/// Access tokens live exactly one day; expiry forces a fresh login.
pub const TOKEN_TTL_MINUTES: i64 = 24 * 60;

/// Referral codes stay redeemable for 60 days after issuance.
pub const REFERRAL_CODE_VALIDITY_DAYS: i64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub email_from: String,
    pub base_url: String,
}

impl AppConfig {
    /// Reads configuration from the environment. A missing `JWT_SECRET` or
    /// `DATABASE_URL` aborts startup here rather than failing per-request.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "hirehub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "hirehub-users".into()),
        };
        let storage = StorageConfig {
            endpoint: std::env::var("S3_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".into()),
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "resumes".into()),
            access_key: std::env::var("S3_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("S3_SECRET_KEY").unwrap_or_default(),
        };
        Ok(Self {
            database_url,
            jwt,
            storage,
            email_from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Hirehub <noreply@hirehub.local>".into()),
            base_url: std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
        })
    }
}

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub gemini_api_key: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_price_id: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub mail_from: String,
    pub support_email: String,
    pub frontend_url: String,
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let smtp_username = require_env("SMTP_USERNAME")?;
        let mail_from = optional_env("MAIL_FROM").unwrap_or_else(|| smtp_username.clone());
        let support_email = optional_env("SUPPORT_EMAIL").unwrap_or_else(|| mail_from.clone());
        let frontend_url = optional_env("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:5173".to_string())
            .trim_end_matches('/')
            .to_string();
        let allowed_origins = optional_env("ALLOWED_ORIGINS")
            .map(|raw| split_origins(&raw))
            .unwrap_or_else(|| vec![frontend_url.clone()]);

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            supabase_url: require_env("SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            supabase_anon_key: require_env("SUPABASE_ANON_KEY")?,
            supabase_service_role_key: require_env("SUPABASE_SERVICE_ROLE_KEY")?,
            supabase_jwt_secret: require_env("SUPABASE_JWT_SECRET")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            stripe_secret_key: require_env("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: require_env("STRIPE_WEBHOOK_SECRET")?,
            stripe_price_id: require_env("STRIPE_PRICE_ID")?,
            cloudinary_cloud_name: require_env("CLOUDINARY_CLOUD_NAME")?,
            cloudinary_api_key: require_env("CLOUDINARY_API_KEY")?,
            cloudinary_api_secret: require_env("CLOUDINARY_API_SECRET")?,
            smtp_host: require_env("SMTP_HOST")?,
            smtp_port: optional_env("SMTP_PORT")
                .unwrap_or_else(|| "587".to_string())
                .parse::<u16>()
                .context("SMTP_PORT must be a valid port number")?,
            smtp_username,
            smtp_password: require_env("SMTP_PASSWORD")?,
            mail_from,
            support_email,
            frontend_url,
            allowed_origins,
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

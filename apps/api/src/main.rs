use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zelia_api::auth::{JwtVerifier, SupabaseAuth};
use zelia_api::config::Config;
use zelia_api::db::{create_pool, run_migrations};
use zelia_api::llm_client::{self, GeminiClient};
use zelia_api::mail::SmtpMailer;
use zelia_api::payments::stripe::StripeClient;
use zelia_api::share::cloudinary::CloudinaryClient;
use zelia_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Zélia API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Vendor clients
    let supabase = SupabaseAuth::new(
        &config.supabase_url,
        config.supabase_anon_key.clone(),
        config.supabase_service_role_key.clone(),
    )?;
    let llm = GeminiClient::new(config.gemini_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let stripe = StripeClient::new(config.stripe_secret_key.clone())?;
    let cloudinary = CloudinaryClient::new(
        config.cloudinary_cloud_name.clone(),
        config.cloudinary_api_key.clone(),
        config.cloudinary_api_secret.clone(),
    )?;
    let mailer = SmtpMailer::new(
        config.smtp_host.clone(),
        config.smtp_port,
        config.smtp_username.clone(),
        config.smtp_password.clone(),
        config.mail_from.clone(),
    );

    // Build app state
    let state = AppState {
        db,
        jwt: JwtVerifier::new(&config.supabase_jwt_secret),
        supabase,
        llm: Arc::new(llm),
        mailer: Arc::new(mailer),
        stripe,
        cloudinary,
        config: config.clone(),
    };

    let app = zelia_api::build_app(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

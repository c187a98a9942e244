use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{JwtVerifier, SupabaseAuth};
use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::mail::Mailer;
use crate::payments::stripe::StripeClient;
use crate::share::cloudinary::CloudinaryClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub jwt: JwtVerifier,
    pub supabase: SupabaseAuth,
    /// Gemini in production; tests swap in a canned generator.
    pub llm: Arc<dyn TextGenerator>,
    pub mailer: Arc<dyn Mailer>,
    pub stripe: StripeClient,
    pub cloudinary: CloudinaryClient,
}

//! Zélia API: the HTTP backend of the Zélia career-orientation game.

pub mod analysis;
pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod errors;
pub mod letter;
pub mod llm_client;
pub mod mail;
pub mod models;
pub mod pagination;
pub mod payments;
pub mod progression;
pub mod questionnaire;
pub mod resources;
pub mod routes;
pub mod share;
pub mod state;
pub mod users;
pub mod validation;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::routes::build_router;
use crate::state::AppState;

/// CORS restricted to the configured front-end origins.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

/// The full application: routes plus tracing, CORS and the panic backstop.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    build_router(state)
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

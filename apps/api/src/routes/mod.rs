pub mod catalog;
pub mod health;
pub mod results;
pub mod support;
pub mod waitlist;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Extension, Router,
};

use crate::resources::ResourceKind;
use crate::share::cloudinary::MAX_SHARE_BODY_BYTES;
use crate::state::AppState;
use crate::{analysis, auth, chat, letter, payments, progression, questionnaire, resources, share, users};

/// CRUD routes shared by activities, jobs and formations. The kind reaches
/// the handlers through an `Extension`.
fn resource_routes(kind: ResourceKind) -> Router<AppState> {
    use resources::handlers::*;
    Router::new()
        .route("/", get(handle_list).post(handle_create))
        .route(
            "/:id",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .layer(Extension(kind))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/register", post(auth::handlers::handle_register))
        .route("/api/auth/login", post(auth::handlers::handle_login))
        .route("/api/auth/refresh", post(auth::handlers::handle_refresh))
        .route("/api/auth/logout", post(auth::handlers::handle_logout))
        .route(
            "/api/auth/forgot-password",
            post(auth::handlers::handle_forgot_password),
        )
        .route("/api/auth/me", get(auth::handlers::handle_me))
        // Profile
        .route(
            "/api/users/me",
            get(users::handlers::handle_get_profile)
                .put(users::handlers::handle_update_profile)
                .delete(users::handlers::handle_delete_account),
        )
        .route(
            "/api/users/me/avatar",
            put(users::handlers::handle_update_avatar),
        )
        .route(
            "/api/users/me/notes",
            get(users::extras::handle_list_notes).post(users::extras::handle_create_note),
        )
        .route(
            "/api/users/me/notes/:id",
            delete(users::extras::handle_delete_note),
        )
        .route(
            "/api/users/me/fields",
            get(users::extras::handle_list_fields).post(users::extras::handle_create_field),
        )
        .route(
            "/api/users/me/fields/:id",
            delete(users::extras::handle_delete_field),
        )
        .route(
            "/api/users/me/schools",
            get(users::extras::handle_list_schools).post(users::extras::handle_create_school),
        )
        .route(
            "/api/users/me/schools/:id",
            delete(users::extras::handle_delete_school),
        )
        .route(
            "/api/users/me/informations",
            get(users::extras::handle_list_informations)
                .post(users::extras::handle_create_information),
        )
        .route(
            "/api/users/me/informations/:id",
            delete(users::extras::handle_delete_information),
        )
        // Activities, jobs, formations
        .nest("/api/activities", resource_routes(ResourceKind::Activity))
        .nest("/api/jobs", resource_routes(ResourceKind::Job))
        .nest("/api/formations", resource_routes(ResourceKind::Formation))
        // Questionnaires and analysis
        .route(
            "/api/questionnaire/submit",
            post(questionnaire::handlers::handle_submit),
        )
        .route(
            "/api/questionnaire/responses",
            get(questionnaire::handlers::handle_list_responses),
        )
        .route(
            "/api/questionnaire/responses/:type",
            get(questionnaire::handlers::handle_responses_for_type),
        )
        .route(
            "/api/questionnaire/status",
            get(questionnaire::handlers::handle_status),
        )
        .route(
            "/api/analysis/generate",
            post(analysis::handlers::handle_generate),
        )
        .route("/api/analysis/parse", post(analysis::handlers::handle_parse))
        .route("/api/results", get(results::handle_list_results))
        .route(
            "/api/results/:type",
            get(results::handle_get_result).delete(results::handle_delete_result),
        )
        // Catalogues
        .route("/api/catalog/metiers", get(catalog::handle_search_metiers))
        .route("/api/catalog/metiers/:id", get(catalog::handle_get_metier))
        .route(
            "/api/catalog/formations",
            get(catalog::handle_search_formations),
        )
        .route(
            "/api/catalog/formations/:id",
            get(catalog::handle_get_formation),
        )
        // Game progression
        .route(
            "/api/progression/:user_id",
            get(progression::handlers::handle_get_progression)
                .put(progression::handlers::handle_update_progression),
        )
        .route(
            "/api/progression/:user_id/complete-level",
            post(progression::handlers::handle_complete_level),
        )
        // AI features
        .route("/api/chat/ai", post(chat::handlers::handle_ai_chat))
        .route(
            "/api/chat/global",
            get(chat::handlers::handle_list_global).post(chat::handlers::handle_post_global),
        )
        .route(
            "/api/letter/generate",
            post(letter::handlers::handle_generate_letter),
        )
        // Payments
        .route(
            "/api/payments/checkout",
            post(payments::handlers::handle_checkout),
        )
        .route(
            "/api/payments/verify/:session_id",
            get(payments::handlers::handle_verify),
        )
        .route(
            "/api/payments/webhook",
            post(payments::handlers::handle_webhook),
        )
        .route("/api/payments/status", get(payments::handlers::handle_status))
        // Sharing, support, waitlist
        .route(
            "/api/share/results",
            post(share::handlers::handle_share_results)
                .layer(DefaultBodyLimit::max(MAX_SHARE_BODY_BYTES)),
        )
        .route("/api/support/bug", post(support::handle_bug_report))
        .route("/api/waitlist", post(waitlist::handle_join_waitlist))
        .with_state(state)
}

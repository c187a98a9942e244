//! Axum route handlers for `/api/payments`.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::{find_profile, mark_paid};
use crate::payments::stripe::{CheckoutParams, CheckoutSession};
use crate::payments::webhook::{verify_signature, Event};
use crate::state::AppState;

const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub paid: bool,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub has_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

/// POST /api/payments/checkout
pub async fn handle_checkout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CheckoutResponse>, AppError> {
    let profile = find_profile(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    if profile.has_paid {
        return Err(AppError::Conflict("Premium access is already unlocked".to_string()));
    }

    let success_url = format!(
        "{}/paiement/succes?session_id={{CHECKOUT_SESSION_ID}}",
        state.config.frontend_url
    );
    let cancel_url = format!("{}/paiement/annule", state.config.frontend_url);

    let session = state
        .stripe
        .create_checkout_session(CheckoutParams {
            user_id: user.id,
            customer_email: Some(profile.email.as_str()),
            price_id: &state.config.stripe_price_id,
            success_url: &success_url,
            cancel_url: &cancel_url,
        })
        .await?;

    Ok(Json(CheckoutResponse {
        session_id: session.id,
        url: session.url,
    }))
}

/// Checkout session ids are `cs_` followed by `[A-Za-z0-9_]`; anything else
/// would change the Stripe URL the id is spliced into.
fn validate_session_id(session_id: &str) -> Result<(), AppError> {
    let well_formed = session_id
        .strip_prefix("cs_")
        .is_some_and(|rest| {
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if !well_formed {
        return Err(AppError::Validation("session_id is not a checkout session".to_string()));
    }
    Ok(())
}

/// GET /api/payments/verify/:session_id
///
/// Fallback for when the client returns from Checkout before the webhook lands.
pub async fn handle_verify(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<VerifyResponse>, AppError> {
    validate_session_id(&session_id)?;
    let session = state.stripe.retrieve_checkout_session(&session_id).await?;
    if session.user_id() != Some(user.id) {
        return Err(AppError::Forbidden);
    }

    let paid = session.is_paid();
    if paid {
        mark_paid(&state.db, user.id, &session.id).await?;
        info!("Verified payment {} for {}", session.id, user.id);
    }
    Ok(Json(VerifyResponse { paid }))
}

/// POST /api/payments/webhook
///
/// Raw body is required: the signature covers the exact bytes Stripe sent.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Validation("missing Stripe-Signature header".to_string()))?;

    verify_signature(
        &body,
        signature,
        &state.config.stripe_webhook_secret,
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        warn!("Rejected Stripe webhook: {e}");
        AppError::Validation(format!("webhook signature rejected: {e}"))
    })?;

    let event: Event = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("invalid event payload: {e}")))?;

    if event.event_type == CHECKOUT_COMPLETED {
        let session: CheckoutSession = serde_json::from_value(event.data.object)
            .map_err(|e| AppError::Validation(format!("invalid checkout session: {e}")))?;
        match session.user_id() {
            Some(user_id) if session.is_paid() => {
                let updated = mark_paid(&state.db, user_id, &session.id).await?;
                info!("Webhook {}: premium unlocked for {user_id} ({updated})", event.id);
            }
            Some(_) => info!("Webhook {}: session {} not paid yet", event.id, session.id),
            None => warn!("Webhook {}: session {} has no user reference", event.id, session.id),
        }
    } else {
        info!("Webhook {}: ignoring {}", event.id, event.event_type);
    }

    Ok(Json(json!({ "received": true })))
}

/// GET /api/payments/status
pub async fn handle_status(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PaymentStatusResponse>, AppError> {
    let profile = find_profile(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(PaymentStatusResponse {
        has_paid: profile.has_paid,
        paid_at: profile.paid_at,
    }))
}

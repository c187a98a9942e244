//! Minimal Stripe REST client: Checkout Session create and retrieve.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Error)]
pub enum StripeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stripe API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<StripeError> for AppError {
    fn from(err: StripeError) -> Self {
        AppError::upstream("stripe", err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub status: Option<String>,
    pub payment_status: String,
    pub client_reference_id: Option<String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    /// User the session was opened for, if the reference is a valid id.
    pub fn user_id(&self) -> Option<Uuid> {
        self.client_reference_id
            .as_deref()
            .and_then(|r| Uuid::parse_str(r).ok())
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: String,
}

/// Parameters for a one-off premium purchase.
pub struct CheckoutParams<'a> {
    pub user_id: Uuid,
    pub customer_email: Option<&'a str>,
    pub price_id: &'a str,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            secret_key,
        })
    }

    pub async fn create_checkout_session(
        &self,
        params: CheckoutParams<'_>,
    ) -> Result<CheckoutSession, StripeError> {
        let form = checkout_form(&params);
        let response = self
            .client
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;
        let session: CheckoutSession = check(response).await?.json().await?;
        debug!("Created checkout session {} for {}", session.id, params.user_id);
        Ok(session)
    }

    pub async fn retrieve_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, StripeError> {
        let response = self
            .client
            .get(format!("{STRIPE_API_BASE}/checkout/sessions/{session_id}"))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Stripe expects bracketed form keys for nested parameters.
fn checkout_form(params: &CheckoutParams<'_>) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("mode", "payment".to_string()),
        ("line_items[0][price]", params.price_id.to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        ("success_url", params.success_url.to_string()),
        ("cancel_url", params.cancel_url.to_string()),
        ("client_reference_id", params.user_id.to_string()),
        ("metadata[user_id]", params.user_id.to_string()),
    ];
    if let Some(email) = params.customer_email {
        form.push(("customer_email", email.to_string()));
    }
    form
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, StripeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("Stripe returned {status}: {body}");
    let message = serde_json::from_str::<StripeErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(StripeError::Api {
        status: status.as_u16(),
        message,
    })
}

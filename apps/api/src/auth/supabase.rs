//! Thin client over the Supabase Auth (GoTrue) REST API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user already registered")]
    AlreadyRegistered,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<SupabaseError> for AppError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::InvalidCredentials => AppError::Unauthorized,
            SupabaseError::AlreadyRegistered => {
                AppError::Conflict("An account already exists for this email".to_string())
            }
            other => AppError::upstream("supabase-auth", other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: SupabaseUser,
}

/// Outcome of a sign-up: with email confirmation enabled Supabase returns
/// the bare user and no session.
#[derive(Debug, Clone, Serialize)]
pub struct SignUp {
    pub user: SupabaseUser,
    pub session: Option<Session>,
}

#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl SupabaseAuth {
    pub fn new(project_url: &str, anon_key: String, service_role_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: format!("{}/auth/v1", project_url.trim_end_matches('/')),
            anon_key,
            service_role_key,
        })
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<SignUp, SupabaseError> {
        let body: Value = self
            .post_json(
                "/signup",
                &json!({ "email": email, "password": password, "data": metadata }),
            )
            .await?;

        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body).map_err(parse_error)?;
            return Ok(SignUp {
                user: session.user.clone(),
                session: Some(session),
            });
        }
        let user: SupabaseUser = serde_json::from_value(body).map_err(parse_error)?;
        Ok(SignUp {
            user,
            session: None,
        })
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SupabaseError> {
        self.post_json(
            "/token?grant_type=password",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, SupabaseError> {
        self.post_json(
            "/token?grant_type=refresh_token",
            &json!({ "refresh_token": refresh_token }),
        )
        .await
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .client
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    pub async fn recover_password(&self, email: &str, redirect_to: &str) -> Result<(), SupabaseError> {
        let response = self
            .client
            .post(format!("{}/recover", self.base_url))
            .query(&[("redirect_to", redirect_to)])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email }))
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    /// Admin call: removes the identity. Requires the service role key.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), SupabaseError> {
        let response = self
            .client
            .delete(format!("{}/admin/users/{user_id}", self.base_url))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, SupabaseError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await?;
        let response = check(response).await?;
        debug!("Supabase Auth {path} succeeded");
        Ok(response.json().await?)
    }
}

fn parse_error(err: serde_json::Error) -> SupabaseError {
    SupabaseError::Api {
        status: 200,
        message: format!("unexpected response shape: {err}"),
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = classify_error(status, &body);
    if matches!(err, SupabaseError::Api { .. }) {
        warn!("Supabase Auth returned {status}: {body}");
    }
    Err(err)
}

/// GoTrue reports errors as `{error, error_description}` or `{code, msg}`
/// depending on the endpoint and version.
fn classify_error(status: StatusCode, body: &str) -> SupabaseError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let field = |key: &str| parsed.get(key).and_then(Value::as_str).unwrap_or_default();

    if field("error") == "invalid_grant" || field("error_code") == "invalid_credentials" {
        return SupabaseError::InvalidCredentials;
    }
    let message = [field("error_description"), field("msg"), field("message")]
        .into_iter()
        .find(|m| !m.is_empty())
        .unwrap_or(body)
        .to_string();
    if field("error_code") == "user_already_exists" || message.contains("already registered") {
        return SupabaseError::AlreadyRegistered;
    }
    SupabaseError::Api {
        status: status.as_u16(),
        message,
    }
}

//! Axum route handlers for `/api/auth`.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::supabase::{Session, SignUp};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::{find_profile, ProfileRow};
use crate::state::AppState;
use crate::validation::{optional_text, validate_email};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: Option<String>,
    pub profile: Option<ProfileRow>,
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SignUp>), AppError> {
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;
    let first_name = optional_text(req.first_name.as_deref());
    let last_name = optional_text(req.last_name.as_deref());

    let signup = state
        .supabase
        .sign_up(
            &email,
            &req.password,
            json!({ "first_name": first_name, "last_name": last_name }),
        )
        .await?;

    sqlx::query(
        r#"
        INSERT INTO profiles (id, email, first_name, last_name)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(signup.user.id)
    .bind(&email)
    .bind(&first_name)
    .bind(&last_name)
    .execute(&state.db)
    .await?;

    info!("Registered user {}", signup.user.id);
    Ok((StatusCode::CREATED, Json(signup)))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let email = validate_email(&req.email)?;
    if req.password.is_empty() {
        return Err(AppError::Validation("password cannot be empty".to_string()));
    }
    let session = state
        .supabase
        .sign_in_with_password(&email, &req.password)
        .await?;
    Ok(Json(session))
}

/// POST /api/auth/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<Session>, AppError> {
    if req.refresh_token.trim().is_empty() {
        return Err(AppError::Validation("refresh_token cannot be empty".to_string()));
    }
    let session = state.supabase.refresh_session(req.refresh_token.trim()).await?;
    Ok(Json(session))
}

/// POST /api/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    state.supabase.sign_out(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/forgot-password
///
/// Always answers `{sent: true}` for a well-formed email.
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let email = validate_email(&req.email)?;
    let redirect_to = format!("{}/reset-password", state.config.frontend_url);
    if let Err(e) = state.supabase.recover_password(&email, &redirect_to).await {
        tracing::warn!("Password recovery request failed: {e}");
    }
    Ok(Json(json!({ "sent": true })))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let profile = find_profile(&state.db, user.id).await?;
    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        profile,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("éééééé").is_ok());
    }
}

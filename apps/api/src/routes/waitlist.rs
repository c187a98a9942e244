use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::extras::WaitlistRow;
use crate::state::AppState;
use crate::validation::{optional_text, validate_email};

const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct WaitlistRequest {
    pub email: String,
    pub first_name: Option<String>,
    pub school: Option<String>,
    pub message: Option<String>,
}

/// POST /api/waitlist
pub async fn handle_join_waitlist(
    State(state): State<AppState>,
    Json(req): Json<WaitlistRequest>,
) -> Result<(StatusCode, Json<WaitlistRow>), AppError> {
    let email = validate_email(&req.email)?;
    let message = optional_text(req.message.as_deref());
    if message
        .as_ref()
        .is_some_and(|m| m.chars().count() > MAX_MESSAGE_CHARS)
    {
        return Err(AppError::Validation(format!(
            "message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let row = sqlx::query_as::<_, WaitlistRow>(
        "INSERT INTO waitlist_requests (email, first_name, school, message) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&email)
    .bind(optional_text(req.first_name.as_deref()))
    .bind(optional_text(req.school.as_deref()))
    .bind(message)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "This email is already on the waitlist"))?;

    info!("Waitlist request from {email}");
    Ok((StatusCode::CREATED, Json(row)))
}

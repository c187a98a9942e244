//! Axum route handlers for `/api/users/me`.

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::{find_profile, ProfileRow};
use crate::state::AppState;
use crate::validation::optional_text;

/// Tables holding per-user rows, cleared when an account is deleted.
const USER_OWNED_TABLES: &[&str] = &[
    "user_responses",
    "user_results",
    "user_progression",
    "user_notes",
    "user_fields",
    "user_schools",
    "informations_complementaires",
    "global_chat",
    "activities",
    "jobs",
    "formations",
];

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub school: Option<String>,
    pub class_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub avatar_config: Value,
}

/// GET /api/users/me
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileRow>, AppError> {
    let profile = find_profile(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(profile))
}

/// PUT /api/users/me
///
/// Absent or blank fields keep their stored value.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileRow>, AppError> {
    let profile = sqlx::query_as::<_, ProfileRow>(
        r#"
        UPDATE profiles SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            birth_date = COALESCE($4, birth_date),
            school = COALESCE($5, school),
            class_level = COALESCE($6, class_level),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(optional_text(req.first_name.as_deref()))
    .bind(optional_text(req.last_name.as_deref()))
    .bind(req.birth_date)
    .bind(optional_text(req.school.as_deref()))
    .bind(optional_text(req.class_level.as_deref()))
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// PUT /api/users/me/avatar
pub async fn handle_update_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AvatarRequest>,
) -> Result<Json<ProfileRow>, AppError> {
    if !req.avatar_config.is_object() {
        return Err(AppError::Validation("avatar_config must be an object".to_string()));
    }
    let profile = sqlx::query_as::<_, ProfileRow>(
        "UPDATE profiles SET avatar_config = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .bind(&req.avatar_config)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(profile))
}

/// DELETE /api/users/me
///
/// Removes every row owned by the caller, then the identity itself.
pub async fn handle_delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;
    for table in USER_OWNED_TABLES {
        sqlx::query(&format!("DELETE FROM {table} WHERE user_id = $1"))
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    state.supabase.delete_user(user.id).await?;
    info!("Deleted account {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}

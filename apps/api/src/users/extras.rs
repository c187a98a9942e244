//! Notes, fields of interest, schools and complementary information.
//! Each collection supports list / create / delete, scoped to the caller.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::extras::{FieldRow, InformationRow, NoteRow, SchoolRow};
use crate::state::AppState;
use crate::validation::{optional_text, require_text};

const MAX_NOTE_CHARS: usize = 5000;
const MAX_LABEL_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub content: String,
    pub level: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFieldRequest {
    pub field_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSchoolRequest {
    pub school_name: String,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInformationRequest {
    pub category: String,
    pub content: String,
}

/// Deletes a row owned by `user_id`; 404 when nothing matched.
async fn delete_owned(
    pool: &PgPool,
    table: &'static str,
    id: Uuid,
    user_id: Uuid,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1 AND user_id = $2"))
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Item {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── Notes ───────────────────────────────────────────────────────────────────

/// GET /api/users/me/notes
pub async fn handle_list_notes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<NoteRow>>, AppError> {
    let rows = sqlx::query_as::<_, NoteRow>(
        "SELECT * FROM user_notes WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// POST /api/users/me/notes
pub async fn handle_create_note(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteRow>), AppError> {
    let content = require_text("content", &req.content, MAX_NOTE_CHARS)?;
    if req.level.is_some_and(|l| l < 1) {
        return Err(AppError::Validation("level must be at least 1".to_string()));
    }
    let row = sqlx::query_as::<_, NoteRow>(
        "INSERT INTO user_notes (user_id, level, content) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user.id)
    .bind(req.level)
    .bind(content)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/users/me/notes/:id
pub async fn handle_delete_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_owned(&state.db, "user_notes", id, user.id).await
}

// ── Fields of interest ──────────────────────────────────────────────────────

/// GET /api/users/me/fields
pub async fn handle_list_fields(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<FieldRow>>, AppError> {
    let rows = sqlx::query_as::<_, FieldRow>(
        "SELECT * FROM user_fields WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// POST /api/users/me/fields
pub async fn handle_create_field(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateFieldRequest>,
) -> Result<(StatusCode, Json<FieldRow>), AppError> {
    let field_name = require_text("field_name", &req.field_name, MAX_LABEL_CHARS)?;
    let row = sqlx::query_as::<_, FieldRow>(
        "INSERT INTO user_fields (user_id, field_name) VALUES ($1, $2) RETURNING *",
    )
    .bind(user.id)
    .bind(field_name)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/users/me/fields/:id
pub async fn handle_delete_field(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_owned(&state.db, "user_fields", id, user.id).await
}

// ── Schools ─────────────────────────────────────────────────────────────────

/// GET /api/users/me/schools
pub async fn handle_list_schools(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<SchoolRow>>, AppError> {
    let rows = sqlx::query_as::<_, SchoolRow>(
        "SELECT * FROM user_schools WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// POST /api/users/me/schools
pub async fn handle_create_school(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateSchoolRequest>,
) -> Result<(StatusCode, Json<SchoolRow>), AppError> {
    let school_name = require_text("school_name", &req.school_name, MAX_LABEL_CHARS)?;
    let row = sqlx::query_as::<_, SchoolRow>(
        "INSERT INTO user_schools (user_id, school_name, city) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user.id)
    .bind(school_name)
    .bind(optional_text(req.city.as_deref()))
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/users/me/schools/:id
pub async fn handle_delete_school(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_owned(&state.db, "user_schools", id, user.id).await
}

// ── Complementary information ───────────────────────────────────────────────

/// GET /api/users/me/informations
pub async fn handle_list_informations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<InformationRow>>, AppError> {
    let rows = sqlx::query_as::<_, InformationRow>(
        "SELECT * FROM informations_complementaires WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// POST /api/users/me/informations
pub async fn handle_create_information(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateInformationRequest>,
) -> Result<(StatusCode, Json<InformationRow>), AppError> {
    let category = require_text("category", &req.category, MAX_LABEL_CHARS)?;
    let content = require_text("content", &req.content, MAX_NOTE_CHARS)?;
    let row = sqlx::query_as::<_, InformationRow>(
        "INSERT INTO informations_complementaires (user_id, category, content) \
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user.id)
    .bind(category)
    .bind(content)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/users/me/informations/:id
pub async fn handle_delete_information(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_owned(&state.db, "informations_complementaires", id, user.id).await
}

//! Axum route handlers for `/api/results`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::results::{find_result, list_results, UserResultRow};
use crate::state::AppState;
use crate::validation::validate_slug;

/// GET /api/results
pub async fn handle_list_results(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<UserResultRow>>, AppError> {
    Ok(Json(list_results(&state.db, user.id).await?))
}

/// GET /api/results/:type
pub async fn handle_get_result(
    State(state): State<AppState>,
    user: AuthUser,
    Path(questionnaire_type): Path<String>,
) -> Result<Json<UserResultRow>, AppError> {
    let questionnaire_type = validate_slug("questionnaire_type", &questionnaire_type)?;
    let result = find_result(&state.db, user.id, &questionnaire_type)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No {questionnaire_type} result")))?;
    Ok(Json(result))
}

/// DELETE /api/results/:type
pub async fn handle_delete_result(
    State(state): State<AppState>,
    user: AuthUser,
    Path(questionnaire_type): Path<String>,
) -> Result<StatusCode, AppError> {
    let questionnaire_type = validate_slug("questionnaire_type", &questionnaire_type)?;
    let deleted = sqlx::query(
        "DELETE FROM user_results WHERE user_id = $1 AND questionnaire_type = $2",
    )
    .bind(user.id)
    .bind(&questionnaire_type)
    .execute(&state.db)
    .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("No {questionnaire_type} result")));
    }
    Ok(StatusCode::NO_CONTENT)
}

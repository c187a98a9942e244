//! Axum route handlers for `/api/questionnaire`.

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::questionnaire::{responses_for_type, UserResponseRow};
use crate::state::AppState;
use crate::validation::validate_slug;

const MAX_QUESTION_ID_CHARS: usize = 100;
const MAX_RESPONSE_CHARS: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct ResponseInput {
    pub question_id: String,
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub questionnaire_type: String,
    pub responses: Vec<ResponseInput>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub questionnaire_type: String,
    pub count: usize,
}

#[derive(Debug, Serialize, FromRow)]
pub struct QuestionnaireStatus {
    pub questionnaire_type: String,
    pub answered: i64,
    pub last_submitted_at: Option<DateTime<Utc>>,
}

/// Trims the answers and rejects empty ids, duplicates and oversized values.
fn validate_responses(responses: Vec<ResponseInput>) -> Result<Vec<(String, String)>, AppError> {
    if responses.is_empty() {
        return Err(AppError::Validation("responses cannot be empty".to_string()));
    }
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(responses.len());
    for item in responses {
        let question_id = item.question_id.trim().to_string();
        if question_id.is_empty() {
            return Err(AppError::Validation("question_id cannot be empty".to_string()));
        }
        if question_id.chars().count() > MAX_QUESTION_ID_CHARS {
            return Err(AppError::Validation(format!(
                "question_id must be at most {MAX_QUESTION_ID_CHARS} characters"
            )));
        }
        if item.response.chars().count() > MAX_RESPONSE_CHARS {
            return Err(AppError::Validation(format!(
                "response to {question_id} must be at most {MAX_RESPONSE_CHARS} characters"
            )));
        }
        if !seen.insert(question_id.clone()) {
            return Err(AppError::Validation(format!(
                "question_id {question_id} appears more than once"
            )));
        }
        cleaned.push((question_id, item.response.trim().to_string()));
    }
    Ok(cleaned)
}

/// POST /api/questionnaire/submit
///
/// Replaces every stored answer of the caller for this questionnaire type.
/// The delete and the inserts share one transaction.
pub async fn handle_submit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let questionnaire_type = validate_slug("questionnaire_type", &req.questionnaire_type)?;
    let responses = validate_responses(req.responses)?;

    let mut tx = state.db.begin().await?;
    sqlx::query("DELETE FROM user_responses WHERE user_id = $1 AND questionnaire_type = $2")
        .bind(user.id)
        .bind(&questionnaire_type)
        .execute(&mut *tx)
        .await?;
    for (question_id, response) in &responses {
        sqlx::query(
            "INSERT INTO user_responses (user_id, question_id, response, questionnaire_type) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(user.id)
        .bind(question_id)
        .bind(response)
        .bind(&questionnaire_type)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(
        "Stored {} {questionnaire_type} responses for {}",
        responses.len(),
        user.id
    );
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            questionnaire_type,
            count: responses.len(),
        }),
    ))
}

/// GET /api/questionnaire/responses
pub async fn handle_list_responses(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<UserResponseRow>>, AppError> {
    let rows = sqlx::query_as::<_, UserResponseRow>(
        "SELECT * FROM user_responses WHERE user_id = $1 ORDER BY questionnaire_type, question_id",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/questionnaire/responses/:type
pub async fn handle_responses_for_type(
    State(state): State<AppState>,
    user: AuthUser,
    Path(questionnaire_type): Path<String>,
) -> Result<Json<Vec<UserResponseRow>>, AppError> {
    let questionnaire_type = validate_slug("questionnaire_type", &questionnaire_type)?;
    let rows = responses_for_type(&state.db, user.id, &questionnaire_type).await?;
    Ok(Json(rows))
}

/// GET /api/questionnaire/status
pub async fn handle_status(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<QuestionnaireStatus>>, AppError> {
    let rows = sqlx::query_as::<_, QuestionnaireStatus>(
        r#"
        SELECT questionnaire_type,
               COUNT(*) AS answered,
               MAX(created_at) AS last_submitted_at
        FROM user_responses
        WHERE user_id = $1
        GROUP BY questionnaire_type
        ORDER BY questionnaire_type
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(question_id: &str, response: &str) -> ResponseInput {
        ResponseInput {
            question_id: question_id.to_string(),
            response: response.to_string(),
        }
    }

    #[test]
    fn test_validate_responses_trims() {
        let cleaned = validate_responses(vec![input(" q1 ", " E "), input("q2", "")]).unwrap();
        assert_eq!(
            cleaned,
            vec![
                ("q1".to_string(), "E".to_string()),
                ("q2".to_string(), String::new())
            ]
        );
    }

    #[test]
    fn test_validate_responses_rejects_empty_set() {
        assert!(matches!(validate_responses(vec![]), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_responses_rejects_blank_id() {
        assert!(validate_responses(vec![input("  ", "oui")]).is_err());
    }

    #[test]
    fn test_validate_responses_rejects_duplicates() {
        let err = validate_responses(vec![input("q1", "a"), input(" q1", "b")]).unwrap_err();
        assert!(err.to_string().contains("q1"));
    }
}

//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::analysis::generator::{generate_analysis, AnalysisOutcome, ParsedAnalysis};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;
use crate::validation::validate_slug;

#[derive(Debug, Deserialize)]
pub struct GenerateAnalysisRequest {
    pub questionnaire_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseAnalysisRequest {
    pub text: String,
}

/// POST /api/analysis/generate
///
/// Runs the analysis for the caller's stored responses. Falls back to a
/// simple, unsaved analysis when the model call fails.
pub async fn handle_generate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<GenerateAnalysisRequest>,
) -> Result<Json<AnalysisOutcome>, AppError> {
    let questionnaire_type = validate_slug("questionnaire_type", &request.questionnaire_type)?;
    let outcome =
        generate_analysis(&state.db, state.llm.as_ref(), user.id, &questionnaire_type).await?;
    Ok(Json(outcome))
}

/// POST /api/analysis/parse
///
/// Re-parses a stored raw analysis without touching the database.
pub async fn handle_parse(
    _user: AuthUser,
    Json(request): Json<ParseAnalysisRequest>,
) -> Result<Json<ParsedAnalysis>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    Ok(Json(ParsedAnalysis::from_text(&request.text)))
}

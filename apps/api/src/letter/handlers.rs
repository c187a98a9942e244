//! Axum route handler for `/api/letter/generate`.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::letter::prompts::{build_letter_prompt, letter_system, LetterInput, Tone};
use crate::models::profile::find_profile;
use crate::models::results::list_results;
use crate::state::AppState;
use crate::validation::{optional_text, require_text};

const MAX_FIELD_CHARS: usize = 200;
const MAX_OFFER_CHARS: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct GenerateLetterRequest {
    pub job_title: String,
    pub company: String,
    pub job_offer: Option<String>,
    pub tone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateLetterResponse {
    pub letter: String,
}

/// POST /api/letter/generate
pub async fn handle_generate_letter(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<GenerateLetterRequest>,
) -> Result<Json<GenerateLetterResponse>, AppError> {
    let job_title = require_text("job_title", &req.job_title, MAX_FIELD_CHARS)?;
    let company = require_text("company", &req.company, MAX_FIELD_CHARS)?;
    let job_offer = optional_text(req.job_offer.as_deref());
    if job_offer
        .as_ref()
        .is_some_and(|o| o.chars().count() > MAX_OFFER_CHARS)
    {
        return Err(AppError::Validation(format!(
            "job_offer must be at most {MAX_OFFER_CHARS} characters"
        )));
    }
    let tone = match optional_text(req.tone.as_deref()) {
        Some(t) => t.parse()?,
        None => Tone::default(),
    };

    let profile = find_profile(&state.db, user.id).await?;
    let results = list_results(&state.db, user.id).await?;
    let prompt = build_letter_prompt(&LetterInput {
        job_title: &job_title,
        company: &company,
        job_offer: job_offer.as_deref(),
        tone,
        profile: profile.as_ref(),
        results: &results,
    });

    let letter = state
        .llm
        .generate(&prompt, &letter_system())
        .await
        .map_err(|e| AppError::Llm(format!("Letter generation failed: {e}")))?;

    info!("Generated a {tone:?} letter for {} ({job_title})", user.id);
    Ok(Json(GenerateLetterResponse {
        letter: letter.trim().to_string(),
    }))
}

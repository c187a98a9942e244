//! Axum route handlers for `/api/chat`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::AuthUser;
use crate::chat::personas::Persona;
use crate::errors::AppError;
use crate::llm_client::ChatTurn;
use crate::models::extras::GlobalChatRow;
use crate::models::profile::find_profile;
use crate::state::AppState;
use crate::validation::require_text;

const MAX_MESSAGE_CHARS: usize = 2000;
/// Older turns are dropped before calling the model.
const MAX_HISTORY_TURNS: usize = 20;
const DEFAULT_GLOBAL_LIMIT: i64 = 50;
const MAX_GLOBAL_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct AiChatRequest {
    pub persona: String,
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct AiChatResponse {
    pub persona: Persona,
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct GlobalChatQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PostGlobalMessage {
    pub content: String,
}

/// Keeps the last `MAX_HISTORY_TURNS` non-empty turns and appends the new message.
fn conversation(history: Vec<ChatTurn>, message: String) -> Vec<ChatTurn> {
    let history: Vec<ChatTurn> = history
        .into_iter()
        .filter(|t| !t.content.trim().is_empty())
        .collect();
    let skip = history.len().saturating_sub(MAX_HISTORY_TURNS);
    let mut turns: Vec<ChatTurn> = history.into_iter().skip(skip).collect();
    turns.push(ChatTurn::user(message));
    turns
}

fn global_limit(limit: Option<i64>) -> Result<i64, AppError> {
    match limit {
        None => Ok(DEFAULT_GLOBAL_LIMIT),
        Some(l) if l < 1 => Err(AppError::Validation("limit must be at least 1".to_string())),
        Some(l) => Ok(l.min(MAX_GLOBAL_LIMIT)),
    }
}

/// POST /api/chat/ai
pub async fn handle_ai_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AiChatRequest>,
) -> Result<Json<AiChatResponse>, AppError> {
    let persona: Persona = req.persona.parse()?;
    let message = require_text("message", &req.message, MAX_MESSAGE_CHARS)?;
    let turns = conversation(req.history, message);

    debug!("{} talks to {persona} ({} turns)", user.id, turns.len());
    let reply = state
        .llm
        .converse(&persona.system_prompt(), &turns)
        .await
        .map_err(|e| AppError::Llm(format!("Chat with {persona} failed: {e}")))?;

    Ok(Json(AiChatResponse { persona, reply }))
}

/// GET /api/chat/global
///
/// Latest messages, oldest first.
pub async fn handle_list_global(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<GlobalChatQuery>,
) -> Result<Json<Vec<GlobalChatRow>>, AppError> {
    let limit = global_limit(query.limit)?;
    let rows = sqlx::query_as::<_, GlobalChatRow>(
        r#"
        SELECT * FROM (
            SELECT * FROM global_chat ORDER BY created_at DESC LIMIT $1
        ) latest
        ORDER BY created_at ASC
        "#,
    )
    .bind(limit)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// POST /api/chat/global
pub async fn handle_post_global(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<PostGlobalMessage>,
) -> Result<(StatusCode, Json<GlobalChatRow>), AppError> {
    let content = require_text("content", &req.content, MAX_MESSAGE_CHARS)?;
    let author = find_profile(&state.db, user.id)
        .await?
        .and_then(|p| p.first_name)
        .filter(|n| !n.trim().is_empty());

    let row = sqlx::query_as::<_, GlobalChatRow>(
        "INSERT INTO global_chat (user_id, author, content) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user.id)
    .bind(author)
    .bind(content)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

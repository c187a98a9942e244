//! Axum route handlers for `/api/progression/:userId`.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json as SqlJson;
use sqlx::{Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::progression::ProgressionRow;
use crate::progression::rules::{Progress, ProgressPatch};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProgressionView {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub progress: Progress,
    /// `None` until the first write.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressionView {
    fn default_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            progress: Progress::default(),
            updated_at: None,
        }
    }
}

impl From<ProgressionRow> for ProgressionView {
    fn from(row: ProgressionRow) -> Self {
        Self {
            user_id: row.user_id,
            progress: Progress {
                level: row.level,
                xp: row.xp,
                quests: row.quests.0,
                perks: row.perks.0,
            },
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompleteLevelRequest {
    pub level: i32,
    pub xp_reward: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CompleteLevelResponse {
    pub advanced: bool,
    #[serde(flatten)]
    pub progression: ProgressionView,
}

/// Locks and loads the caller's row for the rest of the transaction.
async fn load_for_update(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<ProgressionView, AppError> {
    let row = sqlx::query_as::<_, ProgressionRow>(
        "SELECT * FROM user_progression WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row
        .map(ProgressionView::from)
        .unwrap_or_else(|| ProgressionView::default_for(user_id)))
}

async fn save(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    progress: Progress,
) -> Result<ProgressionRow, AppError> {
    let row = sqlx::query_as::<_, ProgressionRow>(
        r#"
        INSERT INTO user_progression (user_id, level, xp, quests, perks, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        ON CONFLICT (user_id) DO UPDATE SET
            level = EXCLUDED.level,
            xp = EXCLUDED.xp,
            quests = EXCLUDED.quests,
            perks = EXCLUDED.perks,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(progress.level)
    .bind(progress.xp)
    .bind(SqlJson(progress.quests))
    .bind(SqlJson(progress.perks))
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

/// GET /api/progression/:userId
pub async fn handle_get_progression(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProgressionView>, AppError> {
    user.ensure_is(user_id)?;
    let row = sqlx::query_as::<_, ProgressionRow>(
        "SELECT * FROM user_progression WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?;
    Ok(Json(
        row.map(ProgressionView::from)
            .unwrap_or_else(|| ProgressionView::default_for(user_id)),
    ))
}

/// PUT /api/progression/:userId
pub async fn handle_update_progression(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(patch): Json<ProgressPatch>,
) -> Result<Json<ProgressionView>, AppError> {
    user.ensure_is(user_id)?;
    let mut tx = state.db.begin().await?;
    let progress = load_for_update(&mut tx, user_id).await?.progress.apply(patch)?;
    let row = save(&mut tx, user_id, progress).await?;
    tx.commit().await?;
    Ok(Json(row.into()))
}

/// POST /api/progression/:userId/complete-level
pub async fn handle_complete_level(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<CompleteLevelRequest>,
) -> Result<Json<CompleteLevelResponse>, AppError> {
    user.ensure_is(user_id)?;
    let mut tx = state.db.begin().await?;
    let current = load_for_update(&mut tx, user_id).await?;
    let (progress, advanced) = current
        .progress
        .clone()
        .complete_level(req.level, req.xp_reward)?;

    let progression = if advanced {
        let row = save(&mut tx, user_id, progress).await?;
        tx.commit().await?;
        info!("User {user_id} completed level {} (now {})", req.level, row.level);
        row.into()
    } else {
        tx.rollback().await?;
        current
    };

    Ok(Json(CompleteLevelResponse {
        advanced,
        progression,
    }))
}

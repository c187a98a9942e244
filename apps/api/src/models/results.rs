use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::parser::NumberedItem;

/// AI-derived analysis for one user and questionnaire type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserResultRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub questionnaire_type: String,
    pub personality_type: String,
    pub personality_analysis: String,
    pub skills_assessment: String,
    pub recommended_jobs: Json<Vec<NumberedItem>>,
    pub recommended_studies: Json<Vec<NumberedItem>>,
    pub advice: String,
    pub raw_analysis: Option<String>,
    pub share_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn find_result(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    questionnaire_type: &str,
) -> Result<Option<UserResultRow>, sqlx::Error> {
    sqlx::query_as::<_, UserResultRow>(
        "SELECT * FROM user_results WHERE user_id = $1 AND questionnaire_type = $2",
    )
    .bind(user_id)
    .bind(questionnaire_type)
    .fetch_optional(pool)
    .await
}

pub async fn list_results(pool: &sqlx::PgPool, user_id: Uuid) -> Result<Vec<UserResultRow>, sqlx::Error> {
    sqlx::query_as::<_, UserResultRow>(
        "SELECT * FROM user_results WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

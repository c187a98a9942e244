use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserResponseRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: String,
    pub response: String,
    pub questionnaire_type: String,
    pub created_at: DateTime<Utc>,
}

pub async fn responses_for_type(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    questionnaire_type: &str,
) -> Result<Vec<UserResponseRow>, sqlx::Error> {
    sqlx::query_as::<_, UserResponseRow>(
        "SELECT * FROM user_responses WHERE user_id = $1 AND questionnaire_type = $2 ORDER BY question_id",
    )
    .bind(user_id)
    .bind(questionnaire_type)
    .fetch_all(pool)
    .await
}

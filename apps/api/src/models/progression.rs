use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProgressionRow {
    pub user_id: Uuid,
    pub level: i32,
    pub xp: i64,
    pub quests: Json<Vec<String>>,
    pub perks: Json<Vec<String>>,
    pub updated_at: DateTime<Utc>,
}

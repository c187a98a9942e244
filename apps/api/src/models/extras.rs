//! Rows of the small per-feature tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NoteRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub level: Option<i32>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FieldRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub field_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SchoolRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub school_name: String,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InformationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WaitlistRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub school: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GlobalChatRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

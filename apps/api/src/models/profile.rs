use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of `profiles`, keyed by the Supabase auth user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub school: Option<String>,
    pub class_level: Option<String>,
    pub avatar_config: Option<Value>,
    pub has_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub stripe_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    /// "Prénom Nom", falling back to whatever part is present.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

pub async fn find_profile(pool: &sqlx::PgPool, user_id: Uuid) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Flags the profile as paid. Idempotent: `paid_at` keeps its first value.
pub async fn mark_paid(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    session_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET has_paid = TRUE,
            paid_at = COALESCE(paid_at, NOW()),
            stripe_session_id = $2,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(session_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: Option<&str>, last: Option<&str>) -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            email: "lea@example.fr".to_string(),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            birth_date: None,
            school: None,
            class_level: None,
            avatar_config: None,
            has_paid: false,
            paid_at: None,
            stripe_session_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_joins_parts() {
        assert_eq!(
            profile(Some("Léa"), Some("Martin")).display_name().as_deref(),
            Some("Léa Martin")
        );
    }

    #[test]
    fn test_display_name_skips_blank_parts() {
        assert_eq!(profile(Some("  "), Some("Martin")).display_name().as_deref(), Some("Martin"));
        assert_eq!(profile(None, None).display_name(), None);
    }
}

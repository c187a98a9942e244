//! Axum route handlers shared by `/api/activities`, `/api/jobs` and `/api/formations`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resource::ResourceRow;
use crate::pagination::{PageParams, Paginated};
use crate::resources::query::{count_query, list_query, ListFilters};
use crate::resources::ResourceKind;
use crate::state::AppState;
use crate::validation::{optional_text, require_text};

const MAX_TITLE_CHARS: usize = 200;

/// Query string of a listing. Kept flat: `serde(flatten)` loses the
/// number parsing of `serde_urlencoded`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListParams {
    fn split(self) -> (ListFilters, PageParams) {
        (
            ListFilters {
                search: self.search,
                category: self.category,
                location: self.location,
            },
            PageParams {
                page: self.page,
                limit: self.limit,
            },
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub details: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub details: Option<Value>,
}

fn validate_details(details: Option<&Value>) -> Result<(), AppError> {
    match details {
        Some(v) if !v.is_object() => Err(AppError::Validation(
            "details must be an object".to_string(),
        )),
        _ => Ok(()),
    }
}

/// 404 if the row is missing, 403 if the caller does not own it.
async fn ensure_owner(
    pool: &PgPool,
    kind: ResourceKind,
    id: Uuid,
    user: &AuthUser,
) -> Result<(), AppError> {
    let owner: Option<Uuid> = sqlx::query_scalar(&format!(
        "SELECT user_id FROM {} WHERE id = $1",
        kind.table()
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    let owner = owner.ok_or_else(|| AppError::NotFound(format!("{} {id} not found", kind.label())))?;
    user.ensure_is(owner)
}

/// Both write statements only match rows owned by the bound user.
fn update_sql(kind: ResourceKind) -> String {
    format!(
        r#"
        UPDATE {} SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            category = COALESCE($4, category),
            location = COALESCE($5, location),
            details = COALESCE($6, details),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $7
        RETURNING *
        "#,
        kind.table()
    )
}

fn delete_sql(kind: ResourceKind) -> String {
    format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", kind.table())
}

/// GET /api/{kind}
pub async fn handle_list(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Query(params): Query<ListParams>,
) -> Result<Json<Paginated<ResourceRow>>, AppError> {
    let (filters, page) = params.split();
    let window = page.window()?;

    let rows = list_query(kind, &filters, window)
        .build_query_as::<ResourceRow>()
        .fetch_all(&state.db)
        .await?;
    let total: i64 = count_query(kind, &filters)
        .build_query_scalar()
        .fetch_one(&state.db)
        .await?;

    Ok(Json(Paginated::new(rows, window, total)))
}

/// GET /api/{kind}/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceRow>, AppError> {
    let row = sqlx::query_as::<_, ResourceRow>(&format!(
        "SELECT * FROM {} WHERE id = $1",
        kind.table()
    ))
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", kind.label())))?;
    Ok(Json(row))
}

/// POST /api/{kind}
pub async fn handle_create(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    user: AuthUser,
    Json(req): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ResourceRow>), AppError> {
    let title = require_text("title", &req.title, MAX_TITLE_CHARS)?;
    validate_details(req.details.as_ref())?;

    let row = sqlx::query_as::<_, ResourceRow>(&format!(
        r#"
        INSERT INTO {} (user_id, title, description, category, location, details)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
        kind.table()
    ))
    .bind(user.id)
    .bind(title)
    .bind(optional_text(req.description.as_deref()))
    .bind(optional_text(req.category.as_deref()))
    .bind(optional_text(req.location.as_deref()))
    .bind(req.details.unwrap_or_else(|| Value::Object(Default::default())))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/{kind}/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResourceRequest>,
) -> Result<Json<ResourceRow>, AppError> {
    let title = req
        .title
        .as_deref()
        .map(|t| require_text("title", t, MAX_TITLE_CHARS))
        .transpose()?;
    validate_details(req.details.as_ref())?;
    ensure_owner(&state.db, kind, id, &user).await?;

    let row = sqlx::query_as::<_, ResourceRow>(&update_sql(kind))
        .bind(id)
        .bind(title)
        .bind(optional_text(req.description.as_deref()))
        .bind(optional_text(req.category.as_deref()))
        .bind(optional_text(req.location.as_deref()))
        .bind(req.details)
        .bind(user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", kind.label())))?;

    Ok(Json(row))
}

/// DELETE /api/{kind}/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ensure_owner(&state.db, kind, id, &user).await?;
    let deleted = sqlx::query(&delete_sql(kind))
        .bind(id)
        .bind(user.id)
        .execute(&state.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("{} {id} not found", kind.label())));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_split() {
        let params = ListParams {
            search: Some("robot".to_string()),
            page: Some(2),
            ..Default::default()
        };
        let (filters, page) = params.split();
        assert_eq!(filters.search.as_deref(), Some("robot"));
        assert_eq!(page.page, Some(2));
        assert_eq!(page.limit, None);
    }

    #[test]
    fn test_validate_details() {
        assert!(validate_details(None).is_ok());
        assert!(validate_details(Some(&serde_json::json!({"duree": "2h"}))).is_ok());
        assert!(validate_details(Some(&serde_json::json!([1, 2]))).is_err());
    }

    #[test]
    fn test_writes_are_scoped_to_owner() {
        for kind in [ResourceKind::Activity, ResourceKind::Job, ResourceKind::Formation] {
            let update = update_sql(kind);
            assert!(update.contains(&format!("UPDATE {} SET", kind.table())));
            assert!(update.contains("WHERE id = $1 AND user_id = $7"));
            assert_eq!(
                delete_sql(kind),
                format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", kind.table())
            );
        }
    }
}

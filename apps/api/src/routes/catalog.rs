//! Public search over the read-only French catalogues.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::db::ilike_pattern;
use crate::errors::AppError;
use crate::models::catalog::{FormationCatalogRow, MetierRow};
use crate::pagination::{PageParams, Paginated, Window};
use crate::state::AppState;
use crate::validation::optional_text;

#[derive(Debug, Default, Deserialize)]
pub struct MetierSearch {
    pub search: Option<String>,
    pub secteur: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormationSearch {
    pub search: Option<String>,
    pub ville: Option<String>,
    pub niveau: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Appends `AND (a ILIKE $n OR b ILIKE $m)` for a free-text search.
fn push_search(qb: &mut QueryBuilder<'_, Postgres>, columns: [&str; 2], search: Option<&str>) {
    if let Some(search) = optional_text(search) {
        let pattern = ilike_pattern(&search);
        qb.push(format!(" AND ({} ILIKE ", columns[0]))
            .push_bind(pattern.clone())
            .push(format!(" OR {} ILIKE ", columns[1]))
            .push_bind(pattern)
            .push(")");
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, column: &str, value: Option<&str>) {
    if let Some(value) = optional_text(value) {
        qb.push(format!(" AND {column} ILIKE "))
            .push_bind(ilike_pattern(&value));
    }
}

fn metier_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &MetierSearch) {
    qb.push(" WHERE TRUE");
    push_search(qb, ["nom", "description"], params.search.as_deref());
    push_filter(qb, "secteur", params.secteur.as_deref());
}

fn formation_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &FormationSearch) {
    qb.push(" WHERE TRUE");
    push_search(qb, ["nom", "etablissement"], params.search.as_deref());
    push_filter(qb, "ville", params.ville.as_deref());
    push_filter(qb, "niveau", params.niveau.as_deref());
}

fn push_window(qb: &mut QueryBuilder<'_, Postgres>, window: Window) {
    qb.push(" ORDER BY nom ASC, id ASC LIMIT ")
        .push_bind(window.limit)
        .push(" OFFSET ")
        .push_bind(window.offset);
}

/// GET /api/catalog/metiers
pub async fn handle_search_metiers(
    State(state): State<AppState>,
    Query(params): Query<MetierSearch>,
) -> Result<Json<Paginated<MetierRow>>, AppError> {
    let window = PageParams {
        page: params.page,
        limit: params.limit,
    }
    .window()?;

    let mut list = QueryBuilder::new("SELECT * FROM metiers_france");
    metier_filters(&mut list, &params);
    push_window(&mut list, window);
    let rows = list.build_query_as::<MetierRow>().fetch_all(&state.db).await?;

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM metiers_france");
    metier_filters(&mut count, &params);
    let total: i64 = count.build_query_scalar().fetch_one(&state.db).await?;

    Ok(Json(Paginated::new(rows, window, total)))
}

/// GET /api/catalog/metiers/:id
pub async fn handle_get_metier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MetierRow>, AppError> {
    let row = sqlx::query_as::<_, MetierRow>("SELECT * FROM metiers_france WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Métier {id} not found")))?;
    Ok(Json(row))
}

/// GET /api/catalog/formations
pub async fn handle_search_formations(
    State(state): State<AppState>,
    Query(params): Query<FormationSearch>,
) -> Result<Json<Paginated<FormationCatalogRow>>, AppError> {
    let window = PageParams {
        page: params.page,
        limit: params.limit,
    }
    .window()?;

    let mut list = QueryBuilder::new("SELECT * FROM formation_france");
    formation_filters(&mut list, &params);
    push_window(&mut list, window);
    let rows = list
        .build_query_as::<FormationCatalogRow>()
        .fetch_all(&state.db)
        .await?;

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM formation_france");
    formation_filters(&mut count, &params);
    let total: i64 = count.build_query_scalar().fetch_one(&state.db).await?;

    Ok(Json(Paginated::new(rows, window, total)))
}

/// GET /api/catalog/formations/:id
pub async fn handle_get_formation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FormationCatalogRow>, AppError> {
    let row = sqlx::query_as::<_, FormationCatalogRow>("SELECT * FROM formation_france WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Formation {id} not found")))?;
    Ok(Json(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metier_search_sql() {
        let params = MetierSearch {
            search: Some("infirm".to_string()),
            secteur: Some("Santé".to_string()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("SELECT * FROM metiers_france");
        metier_filters(&mut qb, &params);
        push_window(
            &mut qb,
            Window {
                page: 1,
                limit: 20,
                offset: 0,
            },
        );
        assert_eq!(
            qb.sql(),
            "SELECT * FROM metiers_france WHERE TRUE AND (nom ILIKE $1 OR description ILIKE $2) \
             AND secteur ILIKE $3 ORDER BY nom ASC, id ASC LIMIT $4 OFFSET $5"
        );
    }

    #[test]
    fn test_formation_blank_filters_are_ignored() {
        let params = FormationSearch {
            search: Some("   ".to_string()),
            niveau: Some("Bac+3".to_string()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM formation_france");
        formation_filters(&mut qb, &params);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM formation_france WHERE TRUE AND niveau ILIKE $1"
        );
    }
}

//! SQL builders for resource listings.

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::db::ilike_pattern;
use crate::pagination::Window;
use crate::resources::ResourceKind;
use crate::validation::optional_text;

/// `?search=&category=&location=` filters of a listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &ListFilters) {
    qb.push(" WHERE TRUE");
    if let Some(search) = optional_text(filters.search.as_deref()) {
        let pattern = ilike_pattern(&search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = optional_text(filters.category.as_deref()) {
        qb.push(" AND category ILIKE ").push_bind(ilike_pattern(&category));
    }
    if let Some(location) = optional_text(filters.location.as_deref()) {
        qb.push(" AND location ILIKE ").push_bind(ilike_pattern(&location));
    }
}

/// Page of rows, newest first.
pub fn list_query(kind: ResourceKind, filters: &ListFilters, window: Window) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT * FROM {}", kind.table()));
    push_filters(&mut qb, filters);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(window.limit)
        .push(" OFFSET ")
        .push_bind(window.offset);
    qb
}

/// Total rows matching the same filters.
pub fn count_query(kind: ResourceKind, filters: &ListFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", kind.table()));
    push_filters(&mut qb, filters);
    qb
}

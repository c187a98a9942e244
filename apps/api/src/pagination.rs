use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// `?page=&limit=` query parameters. Pages are 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolved window into a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PageParams {
    /// Defaults missing values, clamps `limit` to `MAX_LIMIT`, rejects zero
    /// or negative values.
    pub fn window(&self) -> Result<Window, AppError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if limit < 1 {
            return Err(AppError::Validation("limit must be at least 1".to_string()));
        }
        let limit = limit.min(MAX_LIMIT);
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| AppError::Validation("page is too large".to_string()))?;
        Ok(Window {
            page,
            limit,
            offset,
        })
    }
}

/// Paginated list envelope returned by list endpoints.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, window: Window, total: i64) -> Self {
        Self {
            data,
            page: window.page,
            limit: window.limit,
            total,
        }
    }
}

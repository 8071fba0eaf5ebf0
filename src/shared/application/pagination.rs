/// Pagination support for queries
///
/// Offset-based pagination over a strictly ordered sequence. Successive pages
/// with increasing offsets cover the sequence exactly once.
use serde::{Deserialize, Serialize};

use crate::shared::errors::{AppError, AppResult};

/// Validated pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    limit: usize,
    offset: usize,
}

/// Bounds applied when validating raw request values
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
        }
    }
}

impl PaginationParams {
    /// Build parameters from raw values.
    ///
    /// `limit` must be positive and is clamped to `limits.max_limit`;
    /// `offset` must be non-negative. Missing values take the defaults.
    pub fn from_raw(limit: Option<i64>, offset: Option<i64>, limits: PageLimits) -> AppResult<Self> {
        let limit = match limit {
            None => limits.default_limit,
            Some(l) if l <= 0 => {
                return Err(AppError::InvalidInput(format!(
                    "limit must be a positive integer, got {}",
                    l
                )))
            }
            Some(l) => usize::try_from(l).unwrap_or(usize::MAX),
        };

        let offset = match offset {
            None => 0,
            Some(o) if o < 0 => {
                return Err(AppError::InvalidInput(format!(
                    "offset must be zero or greater, got {}",
                    o
                )))
            }
            Some(o) => usize::try_from(o).unwrap_or(usize::MAX),
        };

        Ok(Self {
            limit: limit.min(limits.max_limit.max(1)),
            offset,
        })
    }

    /// Parse parameters from query-string text, rejecting non-numeric values.
    pub fn parse(limit: Option<&str>, offset: Option<&str>, limits: PageLimits) -> AppResult<Self> {
        let parse = |name: &str, raw: Option<&str>| -> AppResult<Option<i64>> {
            raw.map(|value| {
                value.trim().parse::<i64>().map_err(|_| {
                    AppError::InvalidInput(format!("{} must be an integer, got '{}'", name, value))
                })
            })
            .transpose()
        };

        Self::from_raw(parse("limit", limit)?, parse("offset", offset)?, limits)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Paginated result wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub has_more: bool,
}

impl<T> PaginatedResult<T> {
    /// Slice `[offset, offset + limit)` out of an already ordered collection.
    pub fn from_ordered(ordered: Vec<T>, params: &PaginationParams) -> Self {
        let total = ordered.len();
        let has_more = params.offset.saturating_add(params.limit) < total;
        let items = ordered
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .collect();

        Self {
            items,
            total_count: total as u64,
            has_more,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            has_more: self.has_more,
        }
    }
}

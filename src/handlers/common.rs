use serde::Deserialize;

use crate::errors::ServiceError;
use crate::models::SnapshotPeriod;
use crate::{AppState, PaginatedResponse};

/// Pagination parameters for list operations
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationParams {
    /// 1-based page and a limit clamped to the configured bounds.
    pub fn resolve(&self, state: &AppState) -> (u64, u64) {
        (self.page.unwrap_or(1).max(1), state.config.page_size(self.limit))
    }
}

/// Optimistic-concurrency token supplied as `?expected_version=N`.
#[derive(Debug, Default, Deserialize)]
pub struct VersionQuery {
    pub expected_version: Option<i32>,
}

pub fn paginated<T>(items: Vec<T>, total: u64, page: u64, limit: u64) -> PaginatedResponse<T> {
    PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages: total.div_ceil(limit.max(1)),
    }
}

pub fn parse_period(raw: &str) -> Result<SnapshotPeriod, ServiceError> {
    raw.parse().map_err(ServiceError::ValidationError)
}

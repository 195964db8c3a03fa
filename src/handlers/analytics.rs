use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::common::parse_period;
use crate::entities::{analytics_snapshot, batch_update};
use crate::errors::ServiceError;
use crate::models::snapshot::SnapshotMetrics;
use crate::services::analytics::TrendReport;
use crate::{ApiResponse, ApiResult, AppState};

const API_CALCULATOR: &str = "api";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/snapshots", post(generate_snapshot))
        .route("/snapshots/:period", get(snapshot_range))
        .route("/snapshots/:period/latest", get(latest_snapshot))
        .route("/compute/:period", get(compute_snapshot))
        .route("/trend/:period", get(get_trend))
        .route("/recent-updates", get(recent_updates))
}

#[derive(Debug, Deserialize)]
pub struct GenerateSnapshotRequest {
    pub period: String,
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u64>,
}

pub async fn generate_snapshot(
    State(state): State<AppState>,
    Json(payload): Json<GenerateSnapshotRequest>,
) -> ApiResult<analytics_snapshot::Model> {
    let period = parse_period(&payload.period)?;
    let as_of = payload.as_of.unwrap_or_else(Utc::now);
    let snapshot = state
        .services
        .analytics
        .generate_snapshot(period, as_of, API_CALCULATOR)
        .await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

pub async fn compute_snapshot(
    State(state): State<AppState>,
    Path(period): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<SnapshotMetrics> {
    let period = parse_period(&period)?;
    let metrics = state
        .services
        .analytics
        .compute_snapshot(period, query.as_of.unwrap_or_else(Utc::now))
        .await?;
    Ok(Json(ApiResponse::success(metrics)))
}

pub async fn latest_snapshot(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> ApiResult<analytics_snapshot::Model> {
    let period = parse_period(&period)?;
    let snapshot = state
        .services
        .analytics
        .get_latest(period)
        .await?
        .ok_or_else(|| ServiceError::not_found("Snapshot", period))?;
    Ok(Json(ApiResponse::success(snapshot)))
}

pub async fn snapshot_range(
    State(state): State<AppState>,
    Path(period): Path<String>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Vec<analytics_snapshot::Model>> {
    let period = parse_period(&period)?;
    let snapshots = state
        .services
        .analytics
        .get_date_range(period, range.from, range.to)
        .await?;
    Ok(Json(ApiResponse::success(snapshots)))
}

/// `data` is null when either snapshot of the pair is missing.
pub async fn get_trend(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> ApiResult<Option<TrendReport>> {
    let period = parse_period(&period)?;
    let trend = state.services.analytics.get_trend(period).await?;
    Ok(Json(ApiResponse::success(trend)))
}

pub async fn recent_updates(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Vec<batch_update::Model>> {
    let updates = state
        .services
        .analytics
        .recent_updates(query.limit.unwrap_or(20))
        .await?;
    Ok(Json(ApiResponse::success(updates)))
}

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::common::{paginated, PaginationParams};
use crate::entities::farm;
use crate::models::ApprovalStatus;
use crate::services::analytics::FarmSummary;
use crate::services::farms::{RegisterFarmInput, UpdateFarmInput};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register_farm).get(list_farms))
        .route("/:id", get(get_farm).put(update_farm))
        .route("/:id/approval", post(set_approval_status))
        .route("/:id/summary", get(farm_summary))
}

#[derive(Debug, Default, Deserialize)]
pub struct FarmListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<ApprovalStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub actor_id: Uuid,
    pub status: ApprovalStatus,
    pub reason: Option<String>,
}

pub async fn register_farm(
    State(state): State<AppState>,
    Json(payload): Json<RegisterFarmInput>,
) -> ApiResult<farm::Model> {
    let farm = state.services.farms.register_farm(payload).await?;
    Ok(Json(ApiResponse::success(farm)))
}

pub async fn list_farms(
    State(state): State<AppState>,
    Query(query): Query<FarmListQuery>,
) -> ApiResult<PaginatedResponse<farm::Model>> {
    let (page, limit) = PaginationParams {
        page: query.page,
        limit: query.limit,
    }
    .resolve(&state);
    let (items, total) = state
        .services
        .farms
        .list_farms(query.status, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

pub async fn get_farm(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<farm::Model> {
    let farm = state.services.farms.get_farm(id).await?;
    Ok(Json(ApiResponse::success(farm)))
}

pub async fn update_farm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFarmInput>,
) -> ApiResult<farm::Model> {
    let farm = state.services.farms.update_farm(id, payload).await?;
    Ok(Json(ApiResponse::success(farm)))
}

pub async fn set_approval_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> ApiResult<farm::Model> {
    let farm = state
        .services
        .farms
        .set_approval_status(payload.actor_id, id, payload.status, payload.reason)
        .await?;
    Ok(Json(ApiResponse::success(farm)))
}

pub async fn farm_summary(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<FarmSummary> {
    let summary = state.services.analytics.farm_summary(id).await?;
    Ok(Json(ApiResponse::success(summary)))
}

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{paginated, PaginationParams, VersionQuery};
use crate::entities::{batch, batch_update};
use crate::services::lifecycle::{BatchFilter, BatchUpdateInput, CreateBatchInput, DocumentInput};
use crate::models::{BatchStatus, Stage};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_batch).get(list_batches))
        .route("/by-code/:code", get(get_batch_by_code))
        .route("/:id", get(get_batch).delete(delete_batch))
        .route("/:id/updates", post(apply_update))
        .route("/:id/timeline", get(get_timeline))
        .route("/:id/issues/:issue_id/resolve", post(resolve_issue))
        .route("/:id/documents", post(attach_document))
        .route("/:id/visibility", put(set_visibility))
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub farm_id: Option<Uuid>,
    pub stage: Option<Stage>,
    pub status: Option<BatchStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveIssueRequest {
    pub resolution: String,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AttachDocumentRequest {
    #[serde(flatten)]
    pub document: DocumentInput,
    pub uploaded_by: Uuid,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub is_publicly_visible: bool,
}

#[derive(Debug, Serialize)]
pub struct BatchTimeline {
    pub batch_id: Uuid,
    pub events: Vec<batch_update::Model>,
}

pub async fn create_batch(
    State(state): State<AppState>,
    Json(payload): Json<CreateBatchInput>,
) -> ApiResult<batch::Model> {
    let created = state.services.lifecycle.create_batch(payload).await?;
    Ok(Json(ApiResponse::success(created)))
}

pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<BatchListQuery>,
) -> ApiResult<PaginatedResponse<batch::Model>> {
    let (page, limit) = PaginationParams {
        page: query.page,
        limit: query.limit,
    }
    .resolve(&state);
    let filter = BatchFilter {
        farm_id: query.farm_id,
        stage: query.stage,
        status: query.status,
    };

    let (items, total) = state
        .services
        .lifecycle
        .list_batches(&filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

pub async fn get_batch(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<batch::Model> {
    let batch = state.services.lifecycle.get_batch(id).await?;
    Ok(Json(ApiResponse::success(batch)))
}

pub async fn get_batch_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<batch::Model> {
    let batch = state.services.lifecycle.get_batch_by_code(&code).await?;
    Ok(Json(ApiResponse::success(batch)))
}

pub async fn apply_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(version): Query<VersionQuery>,
    Json(payload): Json<BatchUpdateInput>,
) -> ApiResult<batch::Model> {
    let updated = state
        .services
        .lifecycle
        .apply_update(id, version.expected_version, payload)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn get_timeline(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<BatchTimeline> {
    let sequence = state.services.analytics.get_batch_timeline(id).await?;
    let events = sequence.collect().await?;
    Ok(Json(ApiResponse::success(BatchTimeline { batch_id: id, events })))
}

pub async fn resolve_issue(
    State(state): State<AppState>,
    Path((id, issue_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ResolveIssueRequest>,
) -> ApiResult<batch::Model> {
    let updated = state
        .services
        .lifecycle
        .resolve_issue(id, issue_id, payload.resolution, payload.expected_version)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn attach_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachDocumentRequest>,
) -> ApiResult<batch::Model> {
    let updated = state
        .services
        .lifecycle
        .attach_document(id, payload.document, payload.uploaded_by, payload.expected_version)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn set_visibility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VisibilityRequest>,
) -> ApiResult<batch::Model> {
    let updated = state
        .services
        .lifecycle
        .set_public_visibility(id, payload.is_publicly_visible)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_batch(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Uuid> {
    state.services.lifecycle.delete_batch(id).await?;
    Ok(Json(ApiResponse::success(id)))
}

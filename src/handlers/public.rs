use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use crate::services::public_trace::PublicBatchView;
use crate::{ApiResponse, ApiResult, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/trace/:code", get(get_public_trace))
}

pub async fn get_public_trace(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<PublicBatchView> {
    let view = state.services.public_trace.get_public_trace(&code).await?;
    Ok(Json(ApiResponse::success(view)))
}

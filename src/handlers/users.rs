use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::common::{paginated, PaginationParams};
use crate::entities::user;
use crate::errors::ServiceError;
use crate::models::UserRole;
use crate::services::users::RegisterUserInput;
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register_user).get(list_users))
        .route("/login", post(login))
        .route("/:id", get(get_user))
        .route("/:id/role", put(change_role))
        .route("/:id/deactivate", post(deactivate_user))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserInput>,
) -> ApiResult<user::Model> {
    let user = state.services.users.register_user(payload).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> ApiResult<user::Model> {
    let user = state
        .services
        .users
        .verify_credentials(&payload.email, &payload.password)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("invalid email or password".into()))?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<PaginatedResponse<user::Model>> {
    let (page, limit) = PaginationParams {
        page: query.page,
        limit: query.limit,
    }
    .resolve(&state);
    let (items, total) = state.services.users.list_users(query.role, page, limit).await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<user::Model> {
    let user = state.services.users.get_user(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn change_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleRequest>,
) -> ApiResult<user::Model> {
    let user = state.services.users.change_role(id, payload.role).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn deactivate_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<user::Model> {
    let user = state.services.users.deactivate(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

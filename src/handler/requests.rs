// handler/requests.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::servicedb::ServiceExt,
    dtos::servicedtos::*,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn requests_handler() -> Router {
    Router::new()
        .route("/", post(create_request).get(list_my_requests))
        .route("/open", get(list_open_requests))
        .route("/:request_id", get(get_request_details))
        .route("/:request_id/accept", post(accept_request))
        .route("/:request_id/cancel", post(cancel_request))
}

pub async fn create_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateServiceRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state
        .engagement_service
        .create_request(auth.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Service request created successfully",
        request,
    )))
}

pub async fn list_my_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(filter): Query<RequestFilterDto>,
) -> Result<impl IntoResponse, HttpError> {
    let requests = app_state
        .projection_service
        .requests_for_client(auth.user.id, filter.status)
        .await?;

    Ok(Json(ApiResponse::success(
        "Service requests retrieved successfully",
        requests,
    )))
}

pub async fn list_open_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(filter): Query<RequestFilterDto>,
) -> Result<impl IntoResponse, HttpError> {
    let requests = app_state
        .projection_service
        .open_requests(filter.category)
        .await?;

    Ok(Json(ApiResponse::success(
        "Open service requests retrieved successfully",
        requests,
    )))
}

pub async fn get_request_details(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .db_client
        .get_service_request(request_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Service request not found"))?;

    Ok(Json(ApiResponse::success(
        "Service request retrieved successfully",
        request,
    )))
}

pub async fn accept_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let result = app_state
        .engagement_service
        .accept_request(request_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Service request accepted successfully",
        result,
    )))
}

pub async fn cancel_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .engagement_service
        .cancel_request(request_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Service request cancelled successfully",
        request,
    )))
}

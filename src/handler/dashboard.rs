// handler/dashboard.rs
use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    dtos::servicedtos::ApiResponse,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::usermodel::UserRole,
    AppState,
};

pub fn dashboard_handler() -> Router {
    Router::new().route("/", get(get_dashboard))
}

/// Role-dependent projection over the caller's engagements. Re-reads the
/// store on every call; the payload carries the configured poll interval.
pub async fn get_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    match auth.user.role {
        UserRole::Professional => {
            let dashboard = app_state
                .projection_service
                .professional_dashboard(auth.user.id)
                .await?;
            Ok(Json(ApiResponse::success(
                "Dashboard retrieved successfully",
                dashboard,
            ))
            .into_response())
        }
        _ => {
            let dashboard = app_state
                .projection_service
                .client_dashboard(auth.user.id)
                .await?;
            Ok(Json(ApiResponse::success(
                "Dashboard retrieved successfully",
                dashboard,
            ))
            .into_response())
        }
    }
}

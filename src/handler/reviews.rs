// handler/reviews.rs
use std::sync::Arc;

use axum::{
    extract::Path, response::IntoResponse, routing::get, Extension, Json, Router,
};
use uuid::Uuid;

use crate::{dtos::servicedtos::ApiResponse, error::HttpError, AppState};

pub fn reviews_handler() -> Router {
    Router::new().route("/:professional_id/reviews", get(list_professional_reviews))
}

pub async fn list_professional_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(professional_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let reviews = app_state
        .review_service
        .reviews_for_professional(professional_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Reviews retrieved successfully",
        reviews,
    )))
}

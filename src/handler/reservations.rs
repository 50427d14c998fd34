// handler/reservations.rs
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
    dtos::chatdtos::SendMessageDto,
    dtos::servicedtos::*,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::usermodel::UserRole,
    AppState,
};

pub fn reservations_handler() -> Router {
    Router::new()
        .route("/", get(list_my_reservations))
        .route("/:reservation_id", get(get_reservation_details))
        .route("/:reservation_id/accept", post(accept_reservation))
        .route("/:reservation_id/complete", post(complete_reservation))
        .route("/:reservation_id/cancel", post(cancel_reservation))
        .route(
            "/:reservation_id/messages",
            get(list_reservation_messages).post(send_reservation_message),
        )
        .route("/:reservation_id/review", post(submit_review))
}

pub async fn list_my_reservations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(filter): Query<ReservationFilterDto>,
) -> Result<impl IntoResponse, HttpError> {
    let reservations = match auth.user.role {
        UserRole::Professional => {
            app_state
                .projection_service
                .reservations_for_professional(auth.user.id, filter.status)
                .await?
        }
        _ => {
            app_state
                .projection_service
                .reservations_for_client(auth.user.id, filter.status)
                .await?
        }
    };

    Ok(Json(ApiResponse::success(
        "Reservations retrieved successfully",
        reservations,
    )))
}

pub async fn get_reservation_details(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(reservation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    use crate::db::servicedb::ServiceExt;

    let reservation = app_state
        .db_client
        .get_reservation(reservation_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Reservation not found"))?;

    if reservation.client_id != auth.user.id
        && reservation.professional_id != Some(auth.user.id)
    {
        return Err(HttpError::forbidden(
            "Not authorized to view this reservation",
        ));
    }

    Ok(Json(ApiResponse::success(
        "Reservation retrieved successfully",
        reservation,
    )))
}

pub async fn accept_reservation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(reservation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let reservation = app_state
        .engagement_service
        .accept_reservation(reservation_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Reservation accepted successfully",
        reservation,
    )))
}

pub async fn complete_reservation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(reservation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let reservation = app_state
        .engagement_service
        .complete_reservation(reservation_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Reservation completed successfully",
        reservation,
    )))
}

pub async fn cancel_reservation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(reservation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let reservation = app_state
        .engagement_service
        .cancel_reservation(reservation_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Reservation cancelled successfully",
        reservation,
    )))
}

pub async fn list_reservation_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(reservation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let messages = app_state
        .chat_service
        .list_reservation_messages(reservation_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Messages retrieved successfully",
        messages,
    )))
}

pub async fn send_reservation_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(reservation_id): Path<Uuid>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let message = app_state
        .chat_service
        .send_reservation_message(reservation_id, auth.user.id, body.content)
        .await?;

    Ok(Json(ApiResponse::success(
        "Message sent successfully",
        message,
    )))
}

pub async fn submit_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(reservation_id): Path<Uuid>,
    Json(body): Json<SubmitReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let review = app_state
        .review_service
        .submit_review(reservation_id, auth.user.id, body.rating, body.comment)
        .await?;

    Ok(Json(ApiResponse::success(
        "Review submitted successfully",
        review,
    )))
}

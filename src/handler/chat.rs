// handler/chat.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::chatdtos::*,
    dtos::servicedtos::ApiResponse,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn chat_handler() -> Router {
    Router::new()
        .route("/", post(start_chat).get(list_my_chats))
        .route(
            "/:chat_id/messages",
            get(list_chat_messages).post(send_chat_message),
        )
        .route("/:chat_id/convert", post(convert_chat))
}

pub async fn start_chat(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<StartChatDto>,
) -> Result<impl IntoResponse, HttpError> {
    let chat = app_state
        .chat_service
        .start_chat(auth.user.id, body.professional_id)
        .await?;

    Ok(Json(ApiResponse::success("Chat started successfully", chat)))
}

pub async fn list_my_chats(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let chats = app_state.chat_service.list_chats(auth.user.id).await?;

    Ok(Json(ApiResponse::success(
        "Chats retrieved successfully",
        chats,
    )))
}

pub async fn list_chat_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(chat_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let messages = app_state
        .chat_service
        .list_chat_messages(chat_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Messages retrieved successfully",
        messages,
    )))
}

pub async fn send_chat_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let message = app_state
        .chat_service
        .send_chat_message(chat_id, auth.user.id, body.content)
        .await?;

    Ok(Json(ApiResponse::success(
        "Message sent successfully",
        message,
    )))
}

pub async fn convert_chat(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<ConvertChatDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let result = app_state
        .chat_service
        .convert_chat(chat_id, auth.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Chat converted to reservation successfully",
        result,
    )))
}

// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        chat::chat_handler, dashboard::dashboard_handler, requests::requests_handler,
        reservations::reservations_handler, reviews::reviews_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest(
            "/requests",
            requests_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/reservations",
            reservations_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/chats", chat_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/professionals",
            reviews_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/dashboard",
            dashboard_handler().layer(middleware::from_fn(auth)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}

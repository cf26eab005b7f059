use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(crate::api::handlers::health::health))
        .route("/api/chat", post(crate::api::handlers::chat::chat))
        .route(
            "/api/documents",
            post(crate::api::handlers::documents::upload_document),
        )
}

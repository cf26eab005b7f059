//! HTTP surface: routes, handlers, and middleware stack.

pub mod handlers;
pub mod routes;

use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Maximum accepted request body, sized for document uploads.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::chat::chat,
        handlers::documents::upload_document,
        handlers::health::health,
    ),
    components(schemas(
        crate::types::ChatRequest,
        crate::types::ChatResponse,
        crate::types::SourceRef,
        crate::types::DocumentUploadResponse,
        crate::types::HealthResponse,
    )),
    tags(
        (name = "chat", description = "Retrieval-augmented chat"),
        (name = "documents", description = "Document ingestion"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;

/// Assemble the application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    routes::create_router()
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

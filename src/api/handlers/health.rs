use crate::types::HealthResponse;
use crate::AppState;
use axum::{extract::State, Json};

/// Liveness plus a snapshot of index and history sizes.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let indexed_chunks = state.index.read().as_ref().map_or(0, |index| index.len());
    let history_length = state.history.read().len();

    Json(HealthResponse {
        status: "ok".to_string(),
        indexed_chunks,
        history_length,
    })
}

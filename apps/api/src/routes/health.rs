use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a status object with service version and loaded resource counts.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "coach-api",
        "cases": state.resources.cases.len(),
        "embeddings_cached": state.retriever.is_warm(),
        "sessions": state.sessions.len().await,
    }))
}

use crate::api::error::ApiResult;
use crate::api::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

/// GET / - service diagnostics.
pub async fn home(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let stored_vectors = state.semantic.stored_vectors().await?;
    Ok(Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
        "backend": state.info.backend,
        "semantic_search": state.semantic.is_configured(),
        "cached_documents": state.docs.cached_documents(),
        "stored_vectors": stored_vectors,
    })))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

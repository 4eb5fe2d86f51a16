use crate::api::error::ApiResult;
use crate::api::AppState;
use crate::core::search::{RebuildReport, SearchHit, SemanticHit};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ContentParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SemanticParams {
    pub q: Option<String>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct Hits<T> {
    pub query: String,
    pub hits: Vec<T>,
}

/// GET /docs/search/content [searchContent]
pub async fn content(
    State(state): State<AppState>,
    params: Result<Query<ContentParams>, QueryRejection>,
) -> ApiResult<Json<Hits<SearchHit>>> {
    let Query(params) = params?;
    let query = params.q.unwrap_or_default();
    let hits = state.content.search(&query, params.limit).await?;
    Ok(Json(Hits { query, hits }))
}

/// GET /docs/search/semantic
pub async fn semantic(
    State(state): State<AppState>,
    params: Result<Query<SemanticParams>, QueryRejection>,
) -> ApiResult<Json<Hits<SemanticHit>>> {
    let Query(params) = params?;
    let query = params.q.unwrap_or_default();
    let hits = state.semantic.search(&query, params.top_k).await?;
    Ok(Json(Hits { query, hits }))
}

/// POST /docs/embeddings/rebuild
pub async fn rebuild_embeddings(State(state): State<AppState>) -> ApiResult<Json<RebuildReport>> {
    Ok(Json(state.semantic.rebuild().await?))
}

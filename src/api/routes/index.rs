use crate::api::error::ApiResult;
use crate::api::AppState;
use crate::core::lesson_index::IndexUpdate;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct UpdateIndexRequest {
    pub student: String,
    pub doc_id: String,
    pub index_file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReadIndexParams {
    pub file_id: Option<String>,
}

/// POST /docs/index/update [updateIndexJson]
pub async fn update(
    State(state): State<AppState>,
    body: Result<Json<UpdateIndexRequest>, JsonRejection>,
) -> ApiResult<Json<IndexUpdate>> {
    let Json(body) = body?;
    let update = state
        .index
        .update_index(&body.student, &body.doc_id, body.index_file_id.as_deref())
        .await?;
    Ok(Json(update))
}

/// GET /docs/index/read
pub async fn read(
    State(state): State<AppState>,
    params: Result<Query<ReadIndexParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let file_id = params.file_id.unwrap_or_default();
    Ok(Json(state.index.read_index(&file_id).await?))
}

use crate::api::error::ApiResult;
use crate::api::AppState;
use crate::core::docs::{BatchReadItem, DocSummary, DocumentView, PageView};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct DocList<T> {
    pub documents: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for DocList<T> {
    fn from(documents: Vec<T>) -> Self {
        Self {
            total: documents.len(),
            documents,
        }
    }
}

/// The short listing entry: just enough to pick a document.
#[derive(Debug, Serialize)]
pub struct DocName {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleParams {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReadParams {
    pub file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub file_id: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub end_page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct BatchReadRequest {
    pub file_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchReadResponse {
    pub results: Vec<BatchReadItem>,
}

/// GET /docs/all [listAllDocs]
pub async fn list_all(State(state): State<AppState>) -> ApiResult<Json<DocList<DocName>>> {
    let docs = state.docs.list_documents().await?;
    let names: Vec<DocName> = docs
        .into_iter()
        .map(|d| DocName {
            id: d.id,
            name: d.name,
        })
        .collect();
    Ok(Json(names.into()))
}

/// GET /docs/metadata [listDocsMetadata]
pub async fn list_metadata(
    State(state): State<AppState>,
) -> ApiResult<Json<DocList<DocSummary>>> {
    Ok(Json(state.docs.list_documents().await?.into()))
}

/// GET /docs/search?title= [searchDocsByTitle]
pub async fn search_by_title(
    State(state): State<AppState>,
    params: Result<Query<TitleParams>, QueryRejection>,
) -> ApiResult<Json<DocList<DocSummary>>> {
    let Query(params) = params?;
    let title = params.title.unwrap_or_default();
    Ok(Json(state.docs.search_by_title(&title).await?.into()))
}

/// GET /docs/read?file_id= [readDocById]
pub async fn read(
    State(state): State<AppState>,
    params: Result<Query<ReadParams>, QueryRejection>,
) -> ApiResult<Json<DocumentView>> {
    let Query(params) = params?;
    let file_id = params.file_id.unwrap_or_default();
    Ok(Json(state.docs.read_document(&file_id).await?))
}

/// GET /docs/page [readDocPage]
pub async fn read_page(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<PageView>> {
    let Query(params) = params?;
    let file_id = params.file_id.unwrap_or_default();
    let page = state
        .docs
        .read_page(
            &file_id,
            params.page.unwrap_or(1),
            params.page_size,
            params.end_page,
        )
        .await?;
    Ok(Json(page))
}

/// POST /docs/batch_read [batchReadDocs]
pub async fn batch_read(
    State(state): State<AppState>,
    body: Result<Json<BatchReadRequest>, JsonRejection>,
) -> ApiResult<Json<BatchReadResponse>> {
    let Json(body) = body?;
    let results = state.docs.batch_read(&body.file_ids).await?;
    Ok(Json(BatchReadResponse { results }))
}

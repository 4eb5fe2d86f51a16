use crate::api::error::ApiResult;
use crate::api::AppState;
use crate::core::lessons::DocLessons;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

const DEFAULT_LAST_N: usize = 5;

#[derive(Debug, Deserialize)]
pub struct LastParams {
    pub n: Option<usize>,
    pub weekday: Option<String>,
    pub student: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub weekday: Option<String>,
    pub student: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LessonsResponse {
    pub documents: Vec<DocLessons>,
    pub lesson_count: usize,
    pub token_count: usize,
}

impl From<Vec<DocLessons>> for LessonsResponse {
    fn from(documents: Vec<DocLessons>) -> Self {
        let lessons = documents.iter().flat_map(|d| d.lessons.iter());
        let (lesson_count, token_count) =
            lessons.fold((0, 0), |(n, t), l| (n + 1, t + l.token_count));
        Self {
            documents,
            lesson_count,
            token_count,
        }
    }
}

/// GET /docs/lessons/last [getLastLessons]
pub async fn last(
    State(state): State<AppState>,
    params: Result<Query<LastParams>, QueryRejection>,
) -> ApiResult<Json<LessonsResponse>> {
    let Query(params) = params?;
    let docs = state
        .lessons
        .last_lessons(
            params.n.unwrap_or(DEFAULT_LAST_N),
            params.weekday.as_deref(),
            params.student.as_deref(),
        )
        .await?;
    Ok(Json(docs.into()))
}

/// GET /docs/lessons/range [getLessonsInRange]
pub async fn range(
    State(state): State<AppState>,
    params: Result<Query<RangeParams>, QueryRejection>,
) -> ApiResult<Json<LessonsResponse>> {
    let Query(params) = params?;
    let docs = state
        .lessons
        .lessons_in_range(
            params.start.as_deref().unwrap_or_default(),
            params.end.as_deref().unwrap_or_default(),
            params.weekday.as_deref(),
            params.student.as_deref(),
        )
        .await?;
    Ok(Json(docs.into()))
}

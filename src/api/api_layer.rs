// API layer - the axum REST surface the GPT actions call.
//
// Handlers stay thin: pull parameters out of the request, call one core
// service, and let `ApiError` turn failures into `{"detail": ...}` bodies.

pub mod error;

#[path = "routes/route_catalog.rs"]
pub mod routes;

use crate::core::docs::{DocCache, DocsService, DocsSource, IndexFileStore};
use crate::core::lesson_index::IndexService;
use crate::core::lessons::LessonService;
use crate::core::search::{
    ContentSearchService, EmbeddingProvider, EmbeddingStore, SemanticSearchService,
};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Facts about the running service, shown on `GET /`.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub backend: String,
}

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub docs: Arc<DocsService>,
    pub lessons: Arc<LessonService>,
    pub index: Arc<IndexService>,
    pub content: Arc<ContentSearchService>,
    pub semantic: Arc<SemanticSearchService>,
    pub info: ServiceInfo,
}

/// The adapters the services are built from.
pub struct Backends {
    pub source: Arc<dyn DocsSource>,
    pub index_store: Arc<dyn IndexFileStore>,
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    pub embedding_store: Arc<dyn EmbeddingStore>,
}

impl AppState {
    /// Wires every service on top of one shared, cached `DocsService`.
    pub fn new(
        backends: Backends,
        cache: DocCache,
        default_page_size: usize,
        info: ServiceInfo,
    ) -> Self {
        let docs = Arc::new(DocsService::new(backends.source, cache, default_page_size));

        Self {
            lessons: Arc::new(LessonService::new(Arc::clone(&docs))),
            index: Arc::new(IndexService::new(
                Arc::clone(&docs),
                backends.index_store,
            )),
            content: Arc::new(ContentSearchService::new(Arc::clone(&docs))),
            semantic: Arc::new(SemanticSearchService::new(
                Arc::clone(&docs),
                backends.embedder,
                backends.embedding_store,
            )),
            docs,
            info,
        }
    }
}

/// Any origin when `origins` is empty, otherwise exactly the listed ones.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).map_err(|e| anyhow::anyhow!("Invalid CORS origin {}: {}", o, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(routes::health::home))
        .route("/health", get(routes::health::health))
        .route("/docs/all", get(routes::docs::list_all))
        .route("/docs/metadata", get(routes::docs::list_metadata))
        .route("/docs/search", get(routes::docs::search_by_title))
        .route("/docs/read", get(routes::docs::read))
        .route("/docs/page", get(routes::docs::read_page))
        .route("/docs/batch_read", post(routes::docs::batch_read))
        .route("/docs/lessons/last", get(routes::lessons::last))
        .route("/docs/lessons/range", get(routes::lessons::range))
        .route("/docs/search/content", get(routes::search::content))
        .route("/docs/search/semantic", get(routes::search::semantic))
        .route(
            "/docs/embeddings/rebuild",
            post(routes::search::rebuild_embeddings),
        )
        .route("/docs/index/update", post(routes::index::update))
        .route("/docs/index/read", get(routes::index::read))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::embeddings::InMemoryEmbeddingStore;
    use crate::infra::local::LocalDocsSource;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt; // for `oneshot`

    const CHARLOTTE: &str = "Student: Charlotte\n\
        Monday 05/05/2025\n\
        Scales in G major.\n\
        12 May 2025\n\
        Sight reading, Minuet in G.\n";

    fn app(dir: &TempDir) -> Router {
        std::fs::write(dir.path().join("Charlotte - Monday.txt"), CHARLOTTE).unwrap();
        std::fs::write(dir.path().join("Oliver - Tuesday.txt"), "2025-05-06\nRhythm.").unwrap();

        let local = Arc::new(LocalDocsSource::new(dir.path()));
        let backends = Backends {
            source: Arc::clone(&local) as Arc<dyn DocsSource>,
            index_store: local,
            embedder: None,
            embedding_store: Arc::new(InMemoryEmbeddingStore::new()),
        };
        let state = AppState::new(
            backends,
            DocCache::new(Duration::from_secs(60), 16),
            50,
            ServiceInfo {
                backend: "test".to_string(),
            },
        );
        router(state, cors_layer(&[]).unwrap())
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        call(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        call(app, request).await
    }

    #[tokio::test]
    async fn test_health_and_home() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (_, body) = get(app(&dir), "/").await;
        assert_eq!(body["backend"], "test");
        assert_eq!(body["semantic_search"], false);
        assert_eq!(body["stored_vectors"], 0);
    }

    #[tokio::test]
    async fn test_list_and_read() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/docs/all").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["documents"][0]["name"], "Charlotte - Monday");

        let (status, body) = get(app(&dir), "/docs/read?file_id=Oliver%20-%20Tuesday").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "2025-05-06\nRhythm.");
        assert_eq!(body["paragraph_count"], 2);
    }

    #[tokio::test]
    async fn test_errors_use_detail_bodies() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get(app(&dir), "/docs/read?file_id=missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].as_str().unwrap().contains("missing"));

        let (status, body) = get(app(&dir), "/docs/read").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let (status, body) = get(app(&dir), "/docs/page?file_id=x&page=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let (status, _) = get(app(&dir), "/docs/search/semantic?q=scales").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_page_and_batch_read() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(
            app(&dir),
            "/docs/page?file_id=Charlotte%20-%20Monday&page=2&page_size=2",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "Scales in G major.\n12 May 2025");
        assert_eq!(body["total_pages"], 3);
        assert_eq!(body["has_more"], true);

        let (status, body) = post_json(
            app(&dir),
            "/docs/batch_read",
            json!({"file_ids": ["Oliver - Tuesday", "nope"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["ok"], true);
        assert_eq!(body["results"][1]["ok"], false);
    }

    #[tokio::test]
    async fn test_lesson_queries() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/docs/lessons/last?n=1&weekday=monday").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["documents"].as_array().unwrap().len(), 1);
        assert_eq!(body["documents"][0]["lessons"][0]["date"], "2025-05-12");
        assert_eq!(body["lesson_count"], 1);

        let (status, body) = get(
            app(&dir),
            "/docs/lessons/range?start=2025-05-01&end=2025-05-06",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lesson_count"], 2);

        let (status, _) = get(app(&dir), "/docs/lessons/range?start=2025-05-06&end=2025-05-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_content_search() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/docs/search/content?q=minuet").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hits"][0]["file_id"], "Charlotte - Monday");

        let (status, _) = get(app(&dir), "/docs/search/content?q=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_index_update_and_read() {
        let dir = TempDir::new().unwrap();
        let (status, body) = post_json(
            app(&dir),
            "/docs/index/update",
            json!({"student": "Charlotte", "doc_id": "Charlotte - Monday"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entry_count"], 2);

        let uri = format!(
            "/docs/index/read?file_id={}",
            body["index_file_id"].as_str().unwrap()
        );
        let (status, index) = get(app(&dir), &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(index["student"], "Charlotte");

        let (status, _) = post_json(app(&dir), "/docs/index/update", json!({"student": 1})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_index_is_a_server_error() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        std::fs::create_dir_all(dir.path().join("indexes")).unwrap();
        std::fs::write(dir.path().join("indexes").join("broken.json"), "garbage").unwrap();

        let (status, body) = get(app, "/docs/index/read?file_id=broken").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("broken"));
    }
}

// Entry point of the Google Docs proxy for the lesson-notes GPT.
//
// **Architecture Overview:**
// - `core/` = Business logic (documents, lessons, index, search) and the ports
// - `infra/` = Implementations of those ports (Google, local files, OpenAI, SQLite)
// - `api/` = The axum REST surface the GPT actions call
//
// This file's job is to:
// 1. Load configuration
// 2. Build the adapters and inject them into the services
// 3. Serve HTTP until shut down

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "api/api_layer.rs"]
mod api;
mod config;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::api::{AppState, Backends, ServiceInfo};
use crate::config::{AppConfig, DocsBackend, GoogleCredentials};
use crate::core::docs::{DocCache, DocsSource, IndexFileStore};
use crate::core::search::{EmbeddingProvider, EmbeddingStore};
use crate::infra::embeddings::{InMemoryEmbeddingStore, SqliteEmbeddingStore};
use crate::infra::google::{GoogleDriveClient, ServiceAccountAuth};
use crate::infra::local::LocalDocsSource;
use crate::infra::openai::OpenAiEmbeddingClient;
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "gpt_docs_proxy=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let (source, index_store) = docs_backend(&config.backend).await?;

    let embedder: Option<Arc<dyn EmbeddingProvider>> = match &config.openai_api_key {
        Some(key) => Some(Arc::new(OpenAiEmbeddingClient::new(
            key.clone(),
            config.embedding_model.clone(),
        ))),
        None => {
            tracing::warn!("OPENAI_API_KEY not set; semantic search is disabled");
            None
        }
    };

    let embedding_store: Arc<dyn EmbeddingStore> = match &config.embeddings_db {
        Some(path) => Arc::new(
            SqliteEmbeddingStore::new(path)
                .await
                .with_context(|| format!("Failed to open embeddings database {}", path))?,
        ),
        None => Arc::new(InMemoryEmbeddingStore::new()),
    };

    let state = AppState::new(
        Backends {
            source,
            index_store,
            embedder,
            embedding_store,
        },
        DocCache::new(config.doc_cache_ttl, config.doc_cache_capacity),
        config.default_page_size,
        ServiceInfo {
            backend: config.backend.describe(),
        },
    );

    let app = api::router(state, api::cors_layer(&config.cors_origins)?);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        backend = %config.backend.describe(),
        semantic_search = config.openai_api_key.is_some(),
        "Docs proxy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Docs proxy stopped");
    Ok(())
}

/// One adapter serves both the documents and the index sidecars.
async fn docs_backend(
    backend: &DocsBackend,
) -> anyhow::Result<(Arc<dyn DocsSource>, Arc<dyn IndexFileStore>)> {
    match backend {
        DocsBackend::Local(dir) => {
            if !dir.is_dir() {
                anyhow::bail!("DOCS_LOCAL_DIR {} is not a directory", dir.display());
            }
            let local = Arc::new(LocalDocsSource::new(dir));
            let source: Arc<dyn DocsSource> = local.clone();
            let index_store: Arc<dyn IndexFileStore> = local;
            Ok((source, index_store))
        }
        DocsBackend::Google {
            credentials,
            folder_id,
        } => {
            let auth = match credentials {
                GoogleCredentials::KeyFile(path) => ServiceAccountAuth::from_file(path).await,
                GoogleCredentials::InlineJson(json) => ServiceAccountAuth::from_json(json),
            }
            .map_err(|e| anyhow::anyhow!("Failed to load Google service account: {}", e))?;

            let client = Arc::new(GoogleDriveClient::new(auth, folder_id.clone()));
            tracing::info!(
                client_email = %client.client_email(),
                folder_id = folder_id.as_deref().unwrap_or("(any)"),
                "Using Google Drive backend"
            );
            let source: Arc<dyn DocsSource> = client.clone();
            let index_store: Arc<dyn IndexFileStore> = client;
            Ok((source, index_store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

// =============================================================================
// SEMANTIC SEARCH
// =============================================================================
//
// Ranks document chunks by cosine similarity to the query embedding.
//
// Chunk vectors are looked up in the `EmbeddingStore` by a hash of the model
// name and the chunk text, so a chunk is only ever embedded once. Editing a
// lesson changes its text and therefore its key; the old vector is simply
// never asked for again.

use super::chunking::{chunk_document, Chunk};
use super::embeddings::{cosine_similarity, EmbeddingError, EmbeddingProvider, EmbeddingStore};
use crate::core::docs::{DocsError, DocsService};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 5;
pub const MAX_TOP_K: usize = 50;

/// Inputs per embeddings request.
const EMBED_BATCH: usize = 64;

const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Clone, Serialize)]
pub struct SemanticHit {
    pub file_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    pub snippet: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RebuildReport {
    pub documents: usize,
    pub chunks: usize,
    pub embedded: usize,
}

pub struct SemanticSearchService {
    docs: Arc<DocsService>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    store: Arc<dyn EmbeddingStore>,
}

impl SemanticSearchService {
    pub fn new(
        docs: Arc<DocsService>,
        provider: Option<Arc<dyn EmbeddingProvider>>,
        store: Arc<dyn EmbeddingStore>,
    ) -> Self {
        Self {
            docs,
            provider,
            store,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Number of chunk vectors held by the embedding store.
    pub async fn stored_vectors(&self) -> Result<usize, DocsError> {
        Ok(self.store.count().await?)
    }

    fn provider(&self) -> Result<&Arc<dyn EmbeddingProvider>, DocsError> {
        self.provider
            .as_ref()
            .ok_or_else(|| EmbeddingError::NotConfigured.into())
    }

    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<SemanticHit>, DocsError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DocsError::InvalidInput("q must not be empty".to_string()));
        }
        let top_k = top_k.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K);
        let provider = self.provider()?;

        let (_, chunks) = self.collect_chunks().await?;
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let (vectors, _) = self.embed_chunks(provider.as_ref(), &chunks).await?;
        let query_vector = provider
            .embed(&[query.to_string()])
            .await?
            .pop()
            .ok_or_else(|| EmbeddingError::Provider("No embedding returned for query".to_string()))?;

        let mut scored: Vec<(f32, &Chunk)> = chunks
            .iter()
            .zip(vectors.iter())
            .map(|(chunk, vector)| (cosine_similarity(&query_vector, vector), chunk))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(score, chunk)| SemanticHit {
                file_id: chunk.file_id.clone(),
                name: chunk.name.clone(),
                heading: chunk.heading.clone(),
                snippet: snippet(&chunk.text),
                score,
            })
            .collect())
    }

    /// Embeds every chunk of every document ahead of the first search.
    pub async fn rebuild(&self) -> Result<RebuildReport, DocsError> {
        let provider = self.provider()?;
        let (documents, chunks) = self.collect_chunks().await?;
        let (_, embedded) = self.embed_chunks(provider.as_ref(), &chunks).await?;

        tracing::info!(
            documents,
            chunks = chunks.len(),
            embedded,
            "Embedding index rebuilt"
        );

        Ok(RebuildReport {
            documents,
            chunks: chunks.len(),
            embedded,
        })
    }

    async fn collect_chunks(&self) -> Result<(usize, Vec<Chunk>), DocsError> {
        let docs = self.docs.load_documents(|_| true).await?;
        let chunks = docs.iter().flat_map(|doc| chunk_document(doc)).collect();
        Ok((docs.len(), chunks))
    }

    /// Returns one vector per chunk plus how many had to be freshly embedded.
    async fn embed_chunks(
        &self,
        provider: &dyn EmbeddingProvider,
        chunks: &[Chunk],
    ) -> Result<(Vec<Vec<f32>>, usize), EmbeddingError> {
        let keys: Vec<String> = chunks
            .iter()
            .map(|c| cache_key(provider.model(), &c.text))
            .collect();
        let mut known = self.store.get_many(&keys).await?;

        let mut queued = HashSet::new();
        let missing: Vec<(String, &str)> = keys
            .iter()
            .zip(chunks.iter())
            .filter(|(key, _)| !known.contains_key(*key) && queued.insert((*key).clone()))
            .map(|(key, chunk)| (key.clone(), chunk.text.as_str()))
            .collect();

        for batch in missing.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|(_, text)| text.to_string()).collect();
            let vectors = provider.embed(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(EmbeddingError::Provider(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            let items: Vec<(String, Vec<f32>)> = batch
                .iter()
                .map(|(key, _)| key.clone())
                .zip(vectors)
                .collect();
            self.store.put_many(&items).await?;
            known.extend(items);
            tracing::debug!(count = batch.len(), "Embedded chunk batch");
        }

        let vectors = keys
            .iter()
            .map(|key| {
                known
                    .get(key)
                    .cloned()
                    .ok_or_else(|| EmbeddingError::Store(format!("Missing embedding for {}", key)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((vectors, missing.len()))
    }
}

/// Cache key for a chunk: SHA-256 of model and text.
pub fn cache_key(model: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::docs::DocCache;
    use crate::infra::embeddings::InMemoryEmbeddingStore;
    use crate::infra::local::LocalDocsSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Embeds text as counts of a few marker words, so similarity is predictable.
    struct KeywordEmbedder {
        inputs: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        fn model(&self) -> &str {
            "keyword-test"
        }

        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.inputs.fetch_add(inputs.len(), Ordering::SeqCst);
            Ok(inputs
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    ["scales", "chords", "rhythm"]
                        .iter()
                        .map(|w| t.matches(w).count() as f32)
                        .collect()
                })
                .collect())
        }
    }

    fn service(
        files: &[(&str, &str)],
        with_provider: bool,
    ) -> (TempDir, Arc<KeywordEmbedder>, SemanticSearchService) {
        let dir = TempDir::new().unwrap();
        for (name, text) in files {
            std::fs::write(dir.path().join(format!("{}.txt", name)), text).unwrap();
        }
        let source = Arc::new(LocalDocsSource::new(dir.path()));
        let docs = Arc::new(DocsService::new(
            source,
            DocCache::new(Duration::from_secs(60), 16),
            50,
        ));
        let embedder = Arc::new(KeywordEmbedder {
            inputs: AtomicUsize::new(0),
        });
        let provider: Option<Arc<dyn EmbeddingProvider>> = if with_provider {
            Some(Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>)
        } else {
            None
        };
        let store = Arc::new(InMemoryEmbeddingStore::new());
        (dir, embedder, SemanticSearchService::new(docs, provider, store))
    }

    #[tokio::test]
    async fn test_best_match_first() {
        let (_dir, _embedder, search) = service(
            &[
                ("Charlotte", "2025-05-05\nscales scales\n2025-05-12\nchords"),
                ("Oliver", "rhythm exercises"),
            ],
            true,
        );

        let hits = search.search("chords", Some(2)).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].file_id, "Charlotte");
        assert_eq!(hits[0].heading.as_deref(), Some("2025-05-12"));
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_chunks_embedded_once() {
        let (_dir, embedder, search) = service(&[("a", "scales\n\nchords")], true);

        let report = search.rebuild().await.unwrap();
        assert_eq!(report.documents, 1);
        assert_eq!(report.chunks, 1);
        assert_eq!(report.embedded, 1);

        let again = search.rebuild().await.unwrap();
        assert_eq!(again.embedded, 0);
        assert_eq!(search.stored_vectors().await.unwrap(), 1);

        search.search("scales", None).await.unwrap();
        // One chunk plus one query; the chunk came from the store.
        assert_eq!(embedder.inputs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_configured_without_provider() {
        let (_dir, _embedder, search) = service(&[("a", "scales")], false);
        assert!(!search.is_configured());
        assert!(matches!(
            search.search("scales", None).await,
            Err(DocsError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_cache_key_depends_on_model() {
        assert_eq!(cache_key("m", "text"), cache_key("m", "text"));
        assert_ne!(cache_key("m1", "text"), cache_key("m2", "text"));
        assert_eq!(cache_key("m", "text").len(), 64);
    }
}

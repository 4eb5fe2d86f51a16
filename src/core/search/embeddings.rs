// Ports for the embeddings layer. The provider turns text into vectors; the
// store remembers vectors so unchanged text is never embedded twice.

use crate::core::docs::DocsError;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("Embedding store error: {0}")]
    Store(String),

    #[error("Semantic search")]
    NotConfigured,
}

impl From<EmbeddingError> for DocsError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::Provider(msg) => DocsError::Upstream(msg),
            EmbeddingError::Store(msg) => DocsError::Store(msg),
            EmbeddingError::NotConfigured => {
                DocsError::NotConfigured("Semantic search (OPENAI_API_KEY)".to_string())
            }
        }
    }
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Name of the model; part of every cache key.
    fn model(&self) -> &str;

    /// Embeds each input, returning vectors in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Looks up vectors by key; missing keys are simply absent from the map.
    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Vec<f32>>, EmbeddingError>;

    async fn put_many(&self, items: &[(String, Vec<f32>)]) -> Result<(), EmbeddingError>;

    async fn count(&self) -> Result<usize, EmbeddingError>;
}

/// Cosine similarity in `[-1, 1]`. Mismatched lengths and zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}

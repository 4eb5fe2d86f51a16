use crate::core::search::{EmbeddingError, EmbeddingStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;

/// Embedding cache that lives as long as the process.
///
/// Vectors are lost on restart, so the first search after boot re-embeds
/// every chunk.
pub struct InMemoryEmbeddingStore {
    vectors: DashMap<String, Vec<f32>>,
}

impl InMemoryEmbeddingStore {
    pub fn new() -> Self {
        Self {
            vectors: DashMap::new(),
        }
    }
}

impl Default for InMemoryEmbeddingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingStore for InMemoryEmbeddingStore {
    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Vec<f32>>, EmbeddingError> {
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.vectors
                    .get(key)
                    .map(|v| (key.clone(), v.value().clone()))
            })
            .collect())
    }

    async fn put_many(&self, items: &[(String, Vec<f32>)]) -> Result<(), EmbeddingError> {
        for (key, vector) in items {
            self.vectors.insert(key.clone(), vector.clone());
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, EmbeddingError> {
        Ok(self.vectors.len())
    }
}

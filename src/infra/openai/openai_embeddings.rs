use crate::core::search::{EmbeddingError, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

pub struct OpenAiEmbeddingClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiEmbeddingClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let payload = json!({
            "model": self.model,
            "input": inputs,
        });

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmbeddingError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Provider(format!(
                "OpenAI API error: {} - {}",
                status, text
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Provider(format!("Invalid embeddings response: {}", e)))?;

        tracing::debug!(count = inputs.len(), model = %self.model, "Embedded texts");
        Ok(into_ordered_vectors(body))
    }
}

/// The API may answer out of order; `index` says which input each vector is for.
fn into_ordered_vectors(mut body: EmbeddingResponse) -> Vec<Vec<f32>> {
    body.data.sort_by_key(|d| d.index);
    body.data.into_iter().map(|d| d.embedding).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_follow_input_order() {
        let json = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
            ],
            "model": "text-embedding-3-small"
        }"#;

        let body: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            into_ordered_vectors(body),
            vec![vec![1.0, 0.0], vec![0.0, 1.0]]
        );
    }
}

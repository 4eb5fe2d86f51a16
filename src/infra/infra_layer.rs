// The infra module contains implementations of core traits.
// Each backend gets its own submodule.

#[path = "google/mod.rs"]
pub mod google;

#[path = "local/local_docs.rs"]
pub mod local;

#[path = "openai/openai_embeddings.rs"]
pub mod openai;

#[path = "embeddings/embedding_store.rs"]
pub mod embeddings;

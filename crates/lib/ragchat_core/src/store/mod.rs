//! Vector storage for embedded chunks.
//!
//! Two backends implement [`VectorStore`]:
//!
//! - [`local::LocalVectorStore`]: in-memory collection persisted as a JSON
//!   file under the persist directory
//! - [`pg::PgVectorStore`]: PostgreSQL with the `pgvector` extension
//!
//! [`open`] picks the backend from [`RagConfig`].

pub mod local;
pub mod pg;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RagConfig;

pub use local::LocalVectorStore;
pub use pg::PgVectorStore;

/// Errors that can occur while reading or writing a vector store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid collection name: {0:?}")]
    InvalidCollection(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// One embedded piece of a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique within a collection; re-adding an id replaces the chunk.
    pub id: String,
    pub content: String,
    /// Path of the file the chunk came from.
    pub source: String,
    /// Position of the chunk within its source file.
    pub chunk_index: usize,
    pub embedding: Vec<f32>,
}

/// A search hit with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// A collection of embedded chunks searchable by similarity.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace chunks, returning how many were written.
    async fn add(&self, chunks: Vec<Chunk>) -> Result<usize, StoreError>;

    /// Return up to `k` chunks ordered by descending similarity. Ties keep
    /// insertion order.
    async fn similarity_search(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    /// Remove every chunk in the collection.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Open the store configured by `config`.
///
/// Uses PostgreSQL when `DATABASE_URL` is set, otherwise the file-backed store
/// under `persist_dir`.
pub async fn open(config: &RagConfig) -> Result<Arc<dyn VectorStore>, StoreError> {
    match &config.database_url {
        Some(url) => {
            log::info!("using PostgreSQL vector store, collection {}", config.collection_name);
            let store = PgVectorStore::connect(url, &config.collection_name).await?;
            Ok(Arc::new(store))
        }
        None => {
            log::info!(
                "using local vector store at {}, collection {}",
                config.persist_dir.display(),
                config.collection_name
            );
            let store = LocalVectorStore::open(&config.persist_dir, &config.collection_name).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Cosine similarity in `[-1, 1]`; zero vectors score `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Collection names double as file names, so keep them to `[A-Za-z0-9_-]`.
pub(crate) fn validate_collection(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}

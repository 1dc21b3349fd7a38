//! File-backed vector store.
//!
//! Keeps the whole collection in memory and rewrites
//! `{persist_dir}/{collection}.json` after every mutation. Writes go to a
//! temporary file in the same directory which is then renamed over the old
//! one, so a crash never leaves a half-written collection behind.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{Chunk, ScoredChunk, StoreError, VectorStore, cosine_similarity, validate_collection};

#[derive(Serialize, Deserialize)]
struct CollectionFile {
    collection: String,
    chunks: Vec<Chunk>,
}

#[derive(Debug)]
pub struct LocalVectorStore {
    collection: String,
    /// `None` for purely in-memory stores.
    path: Option<PathBuf>,
    chunks: RwLock<Vec<Chunk>>,
}

impl LocalVectorStore {
    /// Open (or create) `collection` under `persist_dir`.
    pub async fn open(persist_dir: &Path, collection: &str) -> Result<Self, StoreError> {
        validate_collection(collection)?;
        tokio::fs::create_dir_all(persist_dir).await?;

        let path = persist_dir.join(format!("{collection}.json"));
        let chunks = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<CollectionFile>(&bytes)?.chunks,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("opened {} with {} chunks", path.display(), chunks.len());

        Ok(Self {
            collection: collection.to_string(),
            path: Some(path),
            chunks: RwLock::new(chunks),
        })
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            path: None,
            chunks: RwLock::new(Vec::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self, chunks: &[Chunk]) -> Result<(), StoreError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let bytes = serde_json::to_vec(&CollectionFile {
            collection: self.collection.clone(),
            chunks: chunks.to_vec(),
        })?;

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }
}

fn check_dimensions(expected: usize, actual: usize) -> Result<(), StoreError> {
    if expected == actual {
        Ok(())
    } else {
        Err(StoreError::DimensionMismatch { expected, actual })
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn add(&self, new_chunks: Vec<Chunk>) -> Result<usize, StoreError> {
        let mut current = self.chunks.write().await;

        let expected = current
            .first()
            .or(new_chunks.first())
            .map(|c| c.embedding.len())
            .unwrap_or_default();
        for chunk in &new_chunks {
            check_dimensions(expected, chunk.embedding.len())?;
        }

        // Memory only changes once the new collection is on disk.
        let mut chunks = current.clone();
        let mut positions: HashMap<String, usize> = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        let written = new_chunks.len();
        for chunk in new_chunks {
            match positions.get(&chunk.id) {
                Some(&i) => chunks[i] = chunk,
                None => {
                    positions.insert(chunk.id.clone(), chunks.len());
                    chunks.push(chunk);
                }
            }
        }

        self.persist(&chunks).await?;
        *current = chunks;
        Ok(written)
    }

    async fn similarity_search(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        let chunks = self.chunks.read().await;
        if k == 0 || chunks.is_empty() {
            return Ok(Vec::new());
        }
        check_dimensions(chunks[0].embedding.len(), embedding.len())?;

        let mut scored: Vec<ScoredChunk> = chunks
            .iter()
            .map(|chunk| ScoredChunk {
                score: cosine_similarity(&chunk.embedding, embedding),
                chunk: chunk.clone(),
            })
            .collect();
        // stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.chunks.read().await.len())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut current = self.chunks.write().await;
        self.persist(&[]).await?;
        current.clear();
        Ok(())
    }
}

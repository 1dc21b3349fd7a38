//! Retrieval-augmented question answering.
//!
//! [`RetrievalQa::ask`] embeds the question, fetches the `k` most similar
//! chunks, stuffs them into the prompt from [`crate::prompt`], and returns
//! the model's reply.

use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::embedding::{Embedder, EmbeddingError};
use crate::llm::{ChatModel, LlmError};
use crate::prompt;
use crate::store::{ScoredChunk, StoreError, VectorStore};

#[derive(Debug, Error)]
pub enum QaError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector store failed: {0}")]
    Store(#[from] StoreError),

    #[error("Chat model failed: {0}")]
    Llm(#[from] LlmError),
}

pub struct RetrievalQa {
    embedder: Embedder,
    store: Arc<dyn VectorStore>,
    model: Arc<dyn ChatModel>,
    k: usize,
}

impl RetrievalQa {
    pub fn new(
        embedder: Embedder,
        store: Arc<dyn VectorStore>,
        model: Arc<dyn ChatModel>,
        k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            model,
            k,
        }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// The `k` chunks most similar to `question`.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>, QaError> {
        let embedding = self.embedder.embed_query(question).await?;
        Ok(self.store.similarity_search(&embedding, self.k).await?)
    }

    /// Answer `question` from the stored documents.
    ///
    /// An empty store still reaches the model, with an empty context.
    pub async fn ask(&self, question: &str) -> Result<String, QaError> {
        let chunks = self.retrieve(question).await?;
        debug!(
            "retrieved {} chunks for question ({} chars), asking {}",
            chunks.len(),
            question.chars().count(),
            self.model.name()
        );

        let context = prompt::build_context(&chunks);
        let filled = prompt::render(&context, question);
        let answer = self.model.complete(&filled).await?;
        Ok(answer.trim().to_string())
    }
}

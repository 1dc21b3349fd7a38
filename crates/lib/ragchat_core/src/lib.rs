//! # ragchat_core
//!
//! Core retrieval and question-answering logic for ragchat: document
//! ingestion, text splitting, embeddings, vector storage and the
//! retrieval-augmented answer chain.

pub mod config;
pub mod embedding;
pub mod ingest;
pub mod llm;
pub mod prompt;
pub mod qa;
pub mod splitter;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}

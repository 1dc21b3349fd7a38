use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("Ingest: {}", .0)]
    Ingest(#[from] ragchat_core::ingest::IngestError),

    #[error("Store: {}", .0)]
    Store(#[from] ragchat_core::store::StoreError),

    #[error("Embedding: {}", .0)]
    Embedding(#[from] ragchat_core::embedding::EmbeddingError),

    #[error("Splitter: {}", .0)]
    Splitter(#[from] ragchat_core::splitter::SplitterError),

    #[error("Http: {}", .0)]
    Http(#[from] reqwest::Error),

    #[error("Url: {}", .0)]
    Url(#[from] url::ParseError),
}

use std::path::Path;

use log::{info, warn};
use ragchat_core::config::RagConfig;
use ragchat_core::embedding::Embedder;
use ragchat_core::ingest;
use ragchat_core::splitter::TextSplitter;
use ragchat_core::store;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

const PREVIEW_CHARS: usize = 200;

#[derive(Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    answer: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

pub async fn ingest(data_dir: &Path, reset: bool) -> Result<()> {
    let config = RagConfig::from_env();
    let store = store::open(&config).await?;

    if reset {
        info!("clearing collection {}", config.collection_name);
        store.clear().await?;
    }

    let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap)?;
    let embedder = Embedder::new(config.embedding.clone());

    info!("ingesting {}", data_dir.display());
    let report = ingest::ingest_folder(data_dir, &splitter, &embedder, store.as_ref()).await?;

    if report.skipped > 0 {
        warn!("{} of {} files skipped", report.skipped, report.files);
    }
    println!(
        "Ingested {} chunks from {} files into {}",
        report.chunks,
        report.files - report.skipped,
        config.collection_name
    );
    Ok(())
}

pub async fn search(query: &str, k: usize) -> Result<()> {
    let config = RagConfig::from_env();
    let store = store::open(&config).await?;
    let embedder = Embedder::new(config.embedding.clone());

    let embedding = embedder.embed_query(query).await?;
    let hits = store.similarity_search(&embedding, k).await?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("Result {} (score {:.4}):", i + 1, hit.score);
        println!("{}", preview(&hit.chunk.content));
        println!(
            "Metadata: source={} chunk_index={}",
            hit.chunk.source, hit.chunk.chunk_index
        );
        println!("---");
    }
    Ok(())
}

pub async fn ask(server: &str, question: &str) -> Result<()> {
    let url = endpoint(server, "/api/chat")?;
    let resp = reqwest::Client::new()
        .post(url)
        .json(&ChatRequest { question })
        .send()
        .await?;

    let status = resp.status();
    if status.is_success() {
        let body: ChatResponse = resp.json().await?;
        println!("{}", body.answer);
        return Ok(());
    }

    let text = resp.text().await?;
    match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => Err(Error::Custom(format!(
            "server returned {status}: {} ({})",
            body.message, body.error
        ))),
        Err(_) => Err(Error::Custom(format!("server returned {status}: {text}"))),
    }
}

pub async fn health(server: &str) -> Result<()> {
    let url = endpoint(server, "/health")?;
    let resp = reqwest::get(url).await?.error_for_status()?;
    println!("{}", resp.text().await?);
    Ok(())
}

fn endpoint(server: &str, path: &str) -> Result<Url> {
    Ok(Url::parse(server)?.join(path)?)
}

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

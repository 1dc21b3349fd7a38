//! ragchat HTTP server binary.
//!
//! Serves the chat page, the compiled browser handler, and `POST /api/chat`.
//! Retrieval and model settings come from the environment (see
//! `ragchat_core::config`); `.env` is loaded first when present.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use ragchat_core::config::RagConfig;
use ragchat_core::embedding::Embedder;
use ragchat_core::qa::RetrievalQa;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "ragchat_server", about = "ragchat question-answering server")]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Directory holding `index.html` and the compiled browser handler.
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ragchat_api=debug,ragchat_core=debug".into()),
        )
        .init();

    let args = Args::parse();
    let rag = RagConfig::from_env();

    info!(
        collection = %rag.collection_name,
        embedding_provider = %rag.embedding.provider,
        embedding_model = %rag.embedding.model,
        llm_provider = %rag.llm.provider,
        llm_model = %rag.llm.model,
        k = rag.retrieval_k,
        "starting ragchat_server"
    );

    let store = ragchat_core::store::open(&rag).await?;
    let chunk_count = store.count().await?;
    if chunk_count == 0 {
        warn!("vector store is empty; run `ragchat ingest` first");
    } else {
        info!(chunks = chunk_count, "vector store ready");
    }

    let model = ragchat_core::llm::from_config(&rag.llm)?;
    let qa = RetrievalQa::new(Embedder::new(rag.embedding.clone()), store, model, rag.retrieval_k);

    let config = ragchat_api::config::ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        static_dir: args.static_dir,
    };

    let state = ragchat_api::AppState {
        config: config.clone(),
        qa: Arc::new(qa),
    };
    let app = ragchat_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, static_dir = %config.static_dir.display(), "listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("ctrl-c received, shutting down");
                    shutdown.cancel();
                }
                Err(e) => warn!("cannot listen for ctrl-c: {e}"),
            }
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}

//! # ragchat_api
//!
//! HTTP API library for ragchat.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use ragchat_core::qa::RetrievalQa;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::ApiConfig;
use crate::handlers::{chat, health, index};

/// Route paths.
pub mod routes {
    pub const GET_INDEX: &str = "/";
    pub const STATIC: &str = "/static";
    pub const POST_API_CHAT: &str = "/api/chat";
    pub const GET_HEALTH: &str = "/health";
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Question-answering chain.
    pub qa: Arc<RetrievalQa>,
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route(routes::GET_INDEX, get(index::index_handler))
        .route(routes::POST_API_CHAT, post(chat::chat_handler))
        .route(routes::GET_HEALTH, get(health::health_handler))
        .nest_service(routes::STATIC, assets)
        .layer(cors)
        .with_state(state)
}

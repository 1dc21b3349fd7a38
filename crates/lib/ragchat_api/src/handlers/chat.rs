//! Chat request handler.

use axum::Json;
use axum::extract::State;
use tracing::{debug, info};

use crate::AppState;
use crate::error::AppResult;
use crate::models::{ChatRequest, ChatResponse};

/// `POST /api/chat`: answer a question from the ingested documents.
///
/// The question is passed through as-is; an empty string is a valid question.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    debug!(question_len = body.question.len(), "chat request");
    let answer = state.qa.ask(&body.question).await?;
    info!(answer_len = answer.len(), "chat answered");
    Ok(Json(ChatResponse { answer }))
}

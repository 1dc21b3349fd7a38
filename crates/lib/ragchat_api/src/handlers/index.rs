//! Landing page.

use axum::extract::State;
use axum::response::Html;

use crate::AppState;
use crate::error::{AppError, AppResult};

/// `GET /`: serve `index.html` from the static directory.
pub async fn index_handler(State(state): State<AppState>) -> AppResult<Html<String>> {
    let path = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Ok(Html(page)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound(format!("{} is missing", path.display())))
        }
        Err(e) => Err(AppError::Internal(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

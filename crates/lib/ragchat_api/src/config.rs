//! API server configuration.

use std::path::PathBuf;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// Directory holding `index.html` and the compiled browser handler.
    pub static_dir: PathBuf,
}

//! Browser side of ragchat.
//!
//! Clicking `#ask` posts the value of `#question` to `/api/chat` and writes
//! the returned `answer` into `#answer`. The request/render logic lives in
//! [`handler`] and is independent of the DOM; [`browser`] wires it to fetch
//! and the page.

use wasm_bindgen::prelude::*;

pub mod handler;

#[cfg(target_arch = "wasm32")]
mod browser;

pub use handler::{AnswerSink, ChatTransport, ClientError, ask, render_answer};

/// Returns the version of the ragchat_wasm package.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

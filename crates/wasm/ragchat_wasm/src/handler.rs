//! Request/render logic of the chat handler.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Endpoint the question is posted to, relative to the page origin.
pub const CHAT_PATH: &str = "/api/chat";

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("response is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response body is null")]
    NullBody,

    #[error("element #{0} not found")]
    MissingElement(&'static str),
}

/// Sends a request body and resolves to the raw response body, whatever the
/// status code.
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    async fn post(&self, path: &str, content_type: &str, body: String)
    -> Result<String, ClientError>;
}

/// Where the rendered answer goes.
pub trait AnswerSink {
    fn show(&self, text: &str) -> Result<(), ClientError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
}

/// Post `question` and render the `answer` field of the reply into `sink`.
///
/// Every failure is returned to the caller and leaves `sink` untouched.
pub async fn ask<T, S>(transport: &T, sink: &S, question: &str) -> Result<(), ClientError>
where
    T: ChatTransport,
    S: AnswerSink,
{
    let body = serde_json::to_string(&ChatRequest { question })?;
    let text = transport.post(CHAT_PATH, JSON_CONTENT_TYPE, body).await?;

    let reply: Value = serde_json::from_str(&text)?;
    if reply.is_null() {
        return Err(ClientError::NullBody);
    }

    log::debug!("answer received for {} byte question", question.len());
    sink.show(&render_answer(reply.get("answer")))
}

/// Format a JSON value the way a browser's `String(value)` would.
pub fn render_answer(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(value) => js_string(value),
    }
}

fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => js_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Numbers are doubles in JS, so large integers lose precision here too.
fn js_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        // -0 prints as 0
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => ryu_js::Buffer::new().format(f).to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use futures::channel::oneshot;
    use futures::executor::{LocalPool, block_on};
    use futures::task::LocalSpawnExt;
    use serde_json::json;

    use super::*;

    type Reply = Result<String, ClientError>;

    #[derive(Debug, Clone)]
    struct Call {
        path: String,
        content_type: String,
        body: String,
    }

    /// Replies are keyed by question so tests control resolution order.
    #[derive(Default)]
    struct ScriptedTransport {
        calls: RefCell<Vec<Call>>,
        replies: RefCell<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    impl ScriptedTransport {
        fn pending(&self, question: &str) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.replies.borrow_mut().insert(question.to_string(), rx);
            tx
        }

        fn ready(&self, question: &str, reply: Reply) {
            let _ = self.pending(question).send(reply);
        }
    }

    impl ChatTransport for ScriptedTransport {
        async fn post(
            &self,
            path: &str,
            content_type: &str,
            body: String,
        ) -> Result<String, ClientError> {
            self.calls.borrow_mut().push(Call {
                path: path.to_string(),
                content_type: content_type.to_string(),
                body: body.clone(),
            });
            let question = serde_json::from_str::<Value>(&body)?["question"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let reply = self
                .replies
                .borrow_mut()
                .remove(&question)
                .ok_or_else(|| ClientError::Network(format!("no reply for {question:?}")))?;
            reply
                .await
                .map_err(|_| ClientError::Network("connection reset".into()))?
        }
    }

    #[derive(Default)]
    struct TextSink {
        text: RefCell<String>,
        writes: Cell<usize>,
    }

    impl TextSink {
        fn with_text(text: &str) -> Self {
            let sink = Self::default();
            *sink.text.borrow_mut() = text.to_string();
            sink
        }

        fn text(&self) -> String {
            self.text.borrow().clone()
        }
    }

    impl AnswerSink for TextSink {
        fn show(&self, text: &str) -> Result<(), ClientError> {
            *self.text.borrow_mut() = text.to_string();
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn posts_question_once_as_json() {
        let transport = ScriptedTransport::default();
        let sink = TextSink::default();
        transport.ready("What is Docker?", Ok(r#"{"answer":"42"}"#.into()));

        block_on(ask(&transport, &sink, "What is Docker?")).unwrap();

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/api/chat");
        assert_eq!(calls[0].content_type, "application/json");
        let body: Value = serde_json::from_str(&calls[0].body).unwrap();
        assert_eq!(body, json!({"question": "What is Docker?"}));
        assert_eq!(sink.text(), "42");
        assert_eq!(sink.writes.get(), 1);
    }

    #[test]
    fn missing_answer_renders_undefined() {
        let transport = ScriptedTransport::default();
        let sink = TextSink::default();
        transport.ready("q", Ok("{}".into()));

        block_on(ask(&transport, &sink, "q")).unwrap();
        assert_eq!(sink.text(), "undefined");
    }

    #[test]
    fn error_bodies_are_parsed_like_any_other() {
        let transport = ScriptedTransport::default();
        let sink = TextSink::default();
        transport.ready(
            "q",
            Ok(r#"{"error":"upstream_error","message":"chat model: down"}"#.into()),
        );

        block_on(ask(&transport, &sink, "q")).unwrap();
        assert_eq!(sink.text(), "undefined");
    }

    #[test]
    fn last_response_to_resolve_wins() {
        let transport = Rc::new(ScriptedTransport::default());
        let sink = Rc::new(TextSink::with_text(""));
        let first = transport.pending("first");
        let second = transport.pending("second");

        let mut pool = LocalPool::new();
        for question in ["first", "second"] {
            let transport = Rc::clone(&transport);
            let sink = Rc::clone(&sink);
            pool.spawner()
                .spawn_local(async move {
                    let _ = ask(&*transport, &*sink, question).await;
                })
                .unwrap();
        }

        pool.run_until_stalled();
        assert_eq!(transport.calls.borrow().len(), 2);
        assert_eq!(sink.writes.get(), 0);

        second.send(Ok(r#"{"answer":"second"}"#.into())).unwrap();
        pool.run_until_stalled();
        assert_eq!(sink.text(), "second");

        first.send(Ok(r#"{"answer":"first"}"#.into())).unwrap();
        pool.run_until_stalled();
        assert_eq!(sink.text(), "first");
        assert_eq!(sink.writes.get(), 2);
    }

    #[test]
    fn network_failure_leaves_output_unchanged() {
        let transport = ScriptedTransport::default();
        let sink = TextSink::with_text("previous answer");
        transport.ready("q", Err(ClientError::Network("connection refused".into())));

        let err = block_on(ask(&transport, &sink, "q")).unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(sink.text(), "previous answer");
        assert_eq!(sink.writes.get(), 0);
    }

    #[test]
    fn non_json_body_fails_without_rendering() {
        let transport = ScriptedTransport::default();
        let sink = TextSink::with_text("previous answer");
        transport.ready("q", Ok("<html>Bad Gateway</html>".into()));

        let err = block_on(ask(&transport, &sink, "q")).unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
        assert_eq!(sink.text(), "previous answer");
    }

    #[test]
    fn null_body_fails_without_rendering() {
        let transport = ScriptedTransport::default();
        let sink = TextSink::with_text("previous answer");
        transport.ready("q", Ok("null".into()));

        let err = block_on(ask(&transport, &sink, "q")).unwrap_err();
        assert!(matches!(err, ClientError::NullBody));
        assert_eq!(sink.writes.get(), 0);
    }

    #[test]
    fn question_survives_json_escaping() {
        let questions = [
            "",
            "quote \" and backslash \\",
            "line one\nline two\ttabbed\r",
            "control \u{0001} char",
            "unicode: héllo 你好 🚀",
            "</script><b>html</b>",
        ];

        for question in questions {
            let transport = ScriptedTransport::default();
            let sink = TextSink::default();
            transport.ready(question, Ok(r#"{"answer":"ok"}"#.into()));

            block_on(ask(&transport, &sink, question)).unwrap();

            let body: Value = serde_json::from_str(&transport.calls.borrow()[0].body).unwrap();
            let object = body.as_object().unwrap();
            assert_eq!(object.len(), 1, "question {question:?}");
            assert_eq!(object["question"], question, "question {question:?}");
        }
    }

    #[test]
    fn render_answer_follows_string_coercion() {
        assert_eq!(render_answer(None), "undefined");
        assert_eq!(render_answer(Some(&json!(null))), "null");
        assert_eq!(render_answer(Some(&json!(true))), "true");
        assert_eq!(render_answer(Some(&json!(42))), "42");
        assert_eq!(render_answer(Some(&json!(-7))), "-7");
        assert_eq!(render_answer(Some(&json!(3.0))), "3");
        assert_eq!(render_answer(Some(&json!(-0.0))), "0");
        assert_eq!(render_answer(Some(&json!(2.5))), "2.5");
        assert_eq!(render_answer(Some(&json!(9007199254740993u64))), "9007199254740992");
        assert_eq!(render_answer(Some(&json!(1e21))), "1e+21");
        assert_eq!(render_answer(Some(&json!(1e-7))), "1e-7");
        assert_eq!(render_answer(Some(&json!(123456789.125))), "123456789.125");
        assert_eq!(render_answer(Some(&json!("  spaced\n"))), "  spaced\n");
        assert_eq!(render_answer(Some(&json!([1, null, "a", [2, 3]]))), "1,,a,2,3");
        assert_eq!(render_answer(Some(&json!([]))), "");
        assert_eq!(render_answer(Some(&json!({"a": 1}))), "[object Object]");
    }
}

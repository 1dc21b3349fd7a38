use gloo_net::http::Request;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{Document, HtmlElement, HtmlInputElement};

use crate::handler::{AnswerSink, ChatTransport, ClientError, ask};

const ASK_ID: &str = "ask";
const QUESTION_ID: &str = "question";
const ANSWER_ID: &str = "answer";

/// `fetch` against the page origin.
struct FetchTransport;

impl ChatTransport for FetchTransport {
    async fn post(
        &self,
        path: &str,
        content_type: &str,
        body: String,
    ) -> Result<String, ClientError> {
        let response = Request::post(path)
            .header("Content-Type", content_type)
            .body(body)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        response.text().await.map_err(network)
    }
}

fn network(e: gloo_net::Error) -> ClientError {
    ClientError::Network(e.to_string())
}

/// Looks the output element up when the answer arrives, not at click time.
struct ElementSink {
    document: Document,
}

impl AnswerSink for ElementSink {
    fn show(&self, text: &str) -> Result<(), ClientError> {
        let element = self
            .document
            .get_element_by_id(ANSWER_ID)
            .ok_or(ClientError::MissingElement(ANSWER_ID))?;
        element.set_text_content(Some(text));
        Ok(())
    }
}

fn read_question(document: &Document) -> Result<String, ClientError> {
    document
        .get_element_by_id(QUESTION_ID)
        .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value())
        .ok_or(ClientError::MissingElement(QUESTION_ID))
}

fn on_ask(document: &Document) -> Result<(), JsValue> {
    let question = read_question(document).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let sink = ElementSink {
        document: document.clone(),
    };

    // Nobody awaits this promise: a failure surfaces as an unhandled
    // rejection and the page is left as it was.
    let _ = future_to_promise(async move {
        ask(&FetchTransport, &sink, &question)
            .await
            .map(|()| JsValue::UNDEFINED)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    });
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let button = document
        .get_element_by_id(ASK_ID)
        .ok_or_else(|| JsValue::from_str(&ClientError::MissingElement(ASK_ID).to_string()))?
        .dyn_into::<HtmlElement>()?;

    let handler = Closure::<dyn FnMut() -> Result<(), JsValue>>::new(move || on_ask(&document));
    button.set_onclick(Some(handler.as_ref().unchecked_ref()));
    handler.forget();

    log::info!("ragchat {} ready", crate::version());
    Ok(())
}

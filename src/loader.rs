use leptos::logging::log;
use leptos::prelude::window;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, Response};

use crate::model::Document;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("{status} {status_text}")]
    Http { status: u16, status_text: String },
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Parse(String),
}

impl LoadError {
    fn network(value: JsValue) -> Self {
        LoadError::Network(describe_js_error(&value))
    }
}

fn describe_js_error(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// One uncached GET of the links document. No retries.
pub async fn load_document(url: &str) -> Result<Document, LoadError> {
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_cache(RequestCache::NoStore);
    let request = Request::new_with_str_and_init(url, &init).map_err(LoadError::network)?;

    let response: Response = JsFuture::from(window().fetch_with_request(&request))
        .await
        .map_err(LoadError::network)?
        .dyn_into()
        .map_err(LoadError::network)?;
    if !response.ok() {
        return Err(LoadError::Http {
            status: response.status(),
            status_text: response.status_text(),
        });
    }

    let body = JsFuture::from(response.text().map_err(LoadError::network)?)
        .await
        .map_err(LoadError::network)?
        .as_string()
        .unwrap_or_default();
    let doc = Document::from_json(&body).map_err(|e| LoadError::Parse(e.to_string()))?;
    log!("loaded {url}: {} links", doc.total_items());
    Ok(doc)
}

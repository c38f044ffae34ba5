//! Browser-backed implementations of the navigation capabilities.

use gloo_net::http::Request;
use navigation::{Fetch, FetchError, History, HistoryError, LocalBoxFuture};
use routing::Location;
use runtime::Timer;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

/// `window.history` plus `window.location`.
pub struct BrowserHistory {
    window: web_sys::Window,
}

impl BrowserHistory {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        Ok(Self { window })
    }

    fn history(&self) -> Result<web_sys::History, HistoryError> {
        self.window
            .history()
            .map_err(|e| HistoryError(js_message(&e)))
    }
}

impl History for BrowserHistory {
    fn location(&self) -> Location {
        let loc = self.window.location();
        let path = loc.pathname().unwrap_or_else(|_| "/".to_string());
        let search = loc.search().unwrap_or_default();
        let hash = loc.hash().unwrap_or_default();
        Location::parse(&format!("{path}{search}{hash}"))
    }

    fn push_state(&self, url: &str) -> Result<(), HistoryError> {
        self.history()?
            .push_state_with_url(&JsValue::NULL, "", Some(url))
            .map_err(|e| HistoryError(js_message(&e)))
    }

    fn replace_state(&self, url: &str) -> Result<(), HistoryError> {
        self.history()?
            .replace_state_with_url(&JsValue::NULL, "", Some(url))
            .map_err(|e| HistoryError(js_message(&e)))
    }
}

/// `setTimeout`-backed one-shot timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowTimer;

impl Timer for WindowTimer {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            tracing::warn!("no window; timer dropped");
            return;
        };
        let handler = Closure::once_into_js(move || callback());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        if let Err(err) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(handler.unchecked_ref(), delay)
        {
            tracing::warn!(error = %js_message(&err), "setTimeout failed");
        }
    }
}

/// STAC JSON over `fetch()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooFetch;

impl Fetch for GlooFetch {
    fn get_json(&self, url: &str) -> LocalBoxFuture<'_, Result<Value, FetchError>> {
        let url = url.to_string();
        Box::pin(async move {
            let resp = Request::get(&url)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| FetchError::Network {
                    url: url.clone(),
                    message: e.to_string(),
                })?;
            if !resp.ok() {
                return Err(FetchError::Status {
                    url,
                    status: resp.status(),
                });
            }
            resp.json::<Value>().await.map_err(|e| FetchError::Decode {
                url,
                message: e.to_string(),
            })
        })
    }
}

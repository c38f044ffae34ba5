use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde_json::Value;

/// Boxed future that need not be `Send`; everything here runs on one thread.
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("GET {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("GET {url} returned an unreadable body: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

/// JSON-over-HTTP GET capability. The browser build uses `gloo-net`, the
/// native tools use `reqwest`, tests use canned responses.
pub trait Fetch {
    fn get_json(&self, url: &str) -> LocalBoxFuture<'_, Result<Value, FetchError>>;
}

impl<F: Fetch + ?Sized> Fetch for Rc<F> {
    fn get_json(&self, url: &str) -> LocalBoxFuture<'_, Result<Value, FetchError>> {
        (**self).get_json(url)
    }
}

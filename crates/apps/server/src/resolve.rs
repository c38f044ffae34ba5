//! Runs the browser's inbound route cascade natively, against live STAC APIs.

use std::rc::Rc;

use catalog::CatalogRegistry;
use navigation::{
    CascadeReport, CascadingResourceLoader, Fetch, FetchError, LocalBoxFuture, MemoryHistory,
    NavigationState, NavigationStateStore, StateSynchronizer, SynchronizerConfig,
};
use runtime::ManualTimer;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Default)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetch for ReqwestFetch {
    fn get_json(&self, url: &str) -> LocalBoxFuture<'_, Result<Value, FetchError>> {
        let url = url.to_string();
        let request = self
            .client
            .get(&url)
            .header(http::header::ACCEPT, "application/json");
        Box::pin(async move {
            let resp = request.send().await.map_err(|e| FetchError::Network {
                url: url.clone(),
                message: e.to_string(),
            })?;
            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }
            resp.json::<Value>().await.map_err(|e| FetchError::Decode {
                url,
                message: e.to_string(),
            })
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    pub generation: u64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    /// `committed` or `not_matched`.
    pub outcome: &'static str,
    pub state: NavigationState,
    pub error: Option<ErrorReport>,
    /// URL after any canonicalizing rewrite.
    pub url: String,
    pub diagnostics: Vec<DiagnosticReport>,
}

/// Loads `url` the way the browser would on a fresh page load.
pub async fn resolve<F: Fetch + 'static>(
    url: &str,
    registry: CatalogRegistry,
    fetch: F,
    config: SynchronizerConfig,
) -> ResolveReport {
    let history = MemoryHistory::new(url);
    let loader = CascadingResourceLoader::from_config(Rc::new(registry), fetch, &config);
    let sync = StateSynchronizer::new(
        NavigationStateStore::new(),
        loader,
        history.clone(),
        ManualTimer::new(),
        config,
    );

    let (outcome, error) = match sync.start().await {
        CascadeReport::Committed { error, .. } => ("committed", error),
        // Nothing else can start a cascade here.
        CascadeReport::RouteNotMatched { .. } | CascadeReport::Superseded => ("not_matched", None),
    };

    ResolveReport {
        outcome,
        state: sync.current_state(),
        error: error.map(|e| ErrorReport {
            code: e.kind.code(),
            message: e.to_string(),
        }),
        url: history.url(),
        diagnostics: sync
            .diagnostics()
            .into_iter()
            .map(|d| DiagnosticReport {
                generation: d.generation,
                kind: d.kind,
                message: d.message,
            })
            .collect(),
    }
}

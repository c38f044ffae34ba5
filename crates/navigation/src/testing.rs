//! Canned network fixtures shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use catalog::CatalogRegistry;
use serde_json::{Value, json};

use crate::fetch::{Fetch, FetchError, LocalBoxFuture};

pub(crate) const E84_COLLECTIONS: &str = "https://earth-search.aws.element84.com/v1/collections";
pub(crate) const PC_COLLECTIONS: &str =
    "https://planetarycomputer.microsoft.com/api/stac/v1/collections";
pub(crate) const CDSE_COLLECTIONS: &str = "https://stac.dataspace.copernicus.eu/v1/collections";

pub(crate) fn s2_item_url(item_id: &str) -> String {
    format!("{E84_COLLECTIONS}/sentinel-2/items/{item_id}")
}

pub(crate) fn registry() -> Rc<CatalogRegistry> {
    Rc::new(CatalogRegistry::builtin())
}

/// Responds from a URL table; unknown URLs are a 404. A gated URL stays
/// pending until its gate is opened.
#[derive(Default)]
pub(crate) struct CannedFetch {
    responses: BTreeMap<String, Result<Value, FetchError>>,
    gates: RefCell<BTreeMap<String, Rc<Cell<bool>>>>,
    calls: RefCell<Vec<String>>,
}

impl CannedFetch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_json(mut self, url: &str, body: Value) -> Self {
        self.responses.insert(url.to_string(), Ok(body));
        self
    }

    pub(crate) fn with_error(mut self, url: &str, err: FetchError) -> Self {
        self.responses.insert(url.to_string(), Err(err));
        self
    }

    /// Closes a gate on `url` and returns the handle that opens it.
    pub(crate) fn gate(&self, url: &str) -> Rc<Cell<bool>> {
        let gate = Rc::new(Cell::new(false));
        self.gates.borrow_mut().insert(url.to_string(), gate.clone());
        gate
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Fetch for CannedFetch {
    fn get_json(&self, url: &str) -> LocalBoxFuture<'_, Result<Value, FetchError>> {
        self.calls.borrow_mut().push(url.to_string());
        let response = self.responses.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        });
        let gate = self.gates.borrow().get(url).cloned();
        Box::pin(async move {
            if let Some(gate) = gate {
                Gate(gate).await;
            }
            response
        })
    }
}

struct Gate(Rc<Cell<bool>>);

impl Future for Gate {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0.get() {
            Poll::Ready(())
        } else {
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Polls once with a no-op waker.
pub(crate) fn poll_once<F: Future + ?Sized>(fut: Pin<&mut F>) -> Option<F::Output> {
    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    match fut.poll(&mut cx) {
        Poll::Ready(v) => Some(v),
        Poll::Pending => None,
    }
}

pub(crate) fn fixture_fetch() -> CannedFetch {
    CannedFetch::new()
        .with_json(
            E84_COLLECTIONS,
            json!({
                "collections": [
                    {"id": "sentinel-2", "title": "Sentinel-2 L2A"},
                    {"id": "landsat-c2-l2", "title": "Landsat Collection 2 Level-2"}
                ],
                "links": [{"rel": "self", "href": E84_COLLECTIONS}]
            }),
        )
        .with_json(
            PC_COLLECTIONS,
            json!({"collections": [{"id": "landsat-c2-l2"}, {"id": "naip"}]}),
        )
        .with_json(
            CDSE_COLLECTIONS,
            json!({"collections": [{"id": "sentinel-2-l2a"}]}),
        )
        .with_json(
            &s2_item_url("S2A_1"),
            json!({
                "type": "Feature",
                "id": "S2A_1",
                "collection": "sentinel-2",
                "bbox": [10.0, 45.0, 11.0, 46.0],
                "properties": {"datetime": "2024-06-01T10:00:00Z"}
            }),
        )
}

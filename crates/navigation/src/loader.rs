//! Cascading materialization of a route: catalog, then collection, then item.
//!
//! Each level is attempted only once its parent has resolved. The first
//! failure stops the cascade; whatever resolved above it is returned as the
//! partial result so the caller can commit the deepest valid state.

use std::rc::Rc;

use catalog::stac::resolve_href;
use catalog::{CatalogDescriptor, CatalogRegistry, CollectionSummary, CollectionsPage, ItemSummary};
use routing::RouteDescriptor;
use runtime::CascadeToken;
use tracing::debug;

use crate::config::SynchronizerConfig;
use crate::fetch::{Fetch, FetchError};
use crate::state::{NavigationState, NavigationUpdate, ViewMode};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    Root,
    Catalog {
        catalog: CatalogDescriptor,
    },
    Collection {
        catalog: CatalogDescriptor,
        collection: CollectionSummary,
    },
    Item {
        catalog: CatalogDescriptor,
        collection: CollectionSummary,
        item: ItemSummary,
    },
}

impl LoadResult {
    pub fn level(&self) -> ViewMode {
        match self {
            LoadResult::Root => ViewMode::Root,
            LoadResult::Catalog { .. } => ViewMode::Catalog,
            LoadResult::Collection { .. } => ViewMode::Collection,
            LoadResult::Item { .. } => ViewMode::Item,
        }
    }

    pub fn catalog(&self) -> Option<&CatalogDescriptor> {
        match self {
            LoadResult::Root => None,
            LoadResult::Catalog { catalog }
            | LoadResult::Collection { catalog, .. }
            | LoadResult::Item { catalog, .. } => Some(catalog),
        }
    }

    pub fn collection(&self) -> Option<&CollectionSummary> {
        match self {
            LoadResult::Collection { collection, .. } | LoadResult::Item { collection, .. } => {
                Some(collection)
            }
            _ => None,
        }
    }

    pub fn item(&self) -> Option<&ItemSummary> {
        match self {
            LoadResult::Item { item, .. } => Some(item),
            _ => None,
        }
    }

    /// State naming the resolved resources. Catalog ids are canonical, so an
    /// alias route yields the id it resolved to.
    pub fn to_state(&self) -> NavigationState {
        NavigationState::from_update(NavigationUpdate {
            view_mode: None,
            catalog_id: self.catalog().map(|c| c.id.clone()),
            collection_id: self.collection().map(|c| c.id.clone()),
            item_id: self.item().map(|i| i.id.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadErrorKind {
    #[error("catalog `{catalog_id}` not found")]
    CatalogNotFound { catalog_id: String },
    #[error("collection `{collection_id}` not found in catalog `{catalog_id}`")]
    CollectionNotFound {
        catalog_id: String,
        collection_id: String,
    },
    #[error("item `{item_id}` not found in collection `{collection_id}`")]
    ItemNotFound {
        collection_id: String,
        item_id: String,
    },
    #[error("failed to load {level}: {source}")]
    TransportFailure {
        level: ViewMode,
        #[source]
        source: FetchError,
    },
}

impl LoadErrorKind {
    /// Stable identifier used in diagnostics and by the browser bindings.
    pub fn code(&self) -> &'static str {
        match self {
            LoadErrorKind::CatalogNotFound { .. } => "catalog_not_found",
            LoadErrorKind::CollectionNotFound { .. } => "collection_not_found",
            LoadErrorKind::ItemNotFound { .. } => "item_not_found",
            LoadErrorKind::TransportFailure { .. } => "transport_failure",
        }
    }
}

/// A failed cascade together with everything that resolved before it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct LoadError {
    pub kind: LoadErrorKind,
    pub partial: LoadResult,
}

impl LoadError {
    /// The level that failed.
    pub fn at_level(&self) -> ViewMode {
        match &self.kind {
            LoadErrorKind::CatalogNotFound { .. } => ViewMode::Catalog,
            LoadErrorKind::CollectionNotFound { .. } => ViewMode::Collection,
            LoadErrorKind::ItemNotFound { .. } => ViewMode::Item,
            LoadErrorKind::TransportFailure { level, .. } => *level,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CascadeOutcome {
    Resolved(LoadResult),
    Failed(LoadError),
    /// A newer cascade or a user navigation took over; nothing may be committed.
    Superseded,
}

enum Interrupted {
    Superseded,
    Transport(FetchError),
}

pub struct CascadingResourceLoader<F> {
    registry: Rc<CatalogRegistry>,
    fetch: F,
    max_collection_pages: usize,
}

impl<F> std::fmt::Debug for CascadingResourceLoader<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadingResourceLoader")
            .field("max_collection_pages", &self.max_collection_pages)
            .finish_non_exhaustive()
    }
}

impl<F: Fetch> CascadingResourceLoader<F> {
    pub fn new(registry: Rc<CatalogRegistry>, fetch: F) -> Self {
        Self {
            registry,
            fetch,
            max_collection_pages: SynchronizerConfig::default().max_collection_pages,
        }
    }

    pub fn from_config(registry: Rc<CatalogRegistry>, fetch: F, config: &SynchronizerConfig) -> Self {
        Self::new(registry, fetch).with_max_collection_pages(config.max_collection_pages)
    }

    pub fn with_max_collection_pages(mut self, pages: usize) -> Self {
        self.max_collection_pages = pages.max(1);
        self
    }

    pub fn registry(&self) -> &CatalogRegistry {
        &self.registry
    }

    /// Resolves `route` level by level. `token` is checked before every
    /// request and after every await; once it is stale the cascade stops
    /// with [`CascadeOutcome::Superseded`].
    pub async fn load(&self, route: &RouteDescriptor, token: &CascadeToken) -> CascadeOutcome {
        if token.is_stale() {
            return CascadeOutcome::Superseded;
        }

        let Some(catalog_id) = route.catalog_id() else {
            return CascadeOutcome::Resolved(LoadResult::Root);
        };
        let catalog = match self.registry.resolve(catalog_id) {
            Ok(catalog) => catalog,
            Err(err) => {
                debug!(catalog_id, error = %err, "catalog lookup failed");
                return failed(
                    LoadErrorKind::CatalogNotFound {
                        catalog_id: catalog_id.to_string(),
                    },
                    LoadResult::Root,
                );
            }
        };

        let Some(collection_id) = route.collection_id() else {
            return CascadeOutcome::Resolved(LoadResult::Catalog { catalog });
        };
        let collection = match self.find_collection(&catalog, collection_id, token).await {
            Ok(Some(collection)) => collection,
            Ok(None) => {
                let kind = LoadErrorKind::CollectionNotFound {
                    catalog_id: catalog.id.clone(),
                    collection_id: collection_id.to_string(),
                };
                return failed(kind, LoadResult::Catalog { catalog });
            }
            Err(Interrupted::Superseded) => return CascadeOutcome::Superseded,
            Err(Interrupted::Transport(source)) => {
                let kind = LoadErrorKind::TransportFailure {
                    level: ViewMode::Collection,
                    source,
                };
                return failed(kind, LoadResult::Catalog { catalog });
            }
        };

        let Some(item_id) = route.item_id() else {
            return CascadeOutcome::Resolved(LoadResult::Collection {
                catalog,
                collection,
            });
        };
        if token.is_stale() {
            return CascadeOutcome::Superseded;
        }
        let url = catalog.endpoint.item_url(&collection.id, item_id);
        debug!(%url, generation = token.generation(), "fetching item");
        let response = self.fetch.get_json(&url).await;
        if token.is_stale() {
            return CascadeOutcome::Superseded;
        }

        let not_found = LoadErrorKind::ItemNotFound {
            collection_id: collection.id.clone(),
            item_id: item_id.to_string(),
        };
        let kind = match response {
            Ok(value) => match ItemSummary::from_value(value) {
                Ok(item) if item.id == item_id => {
                    return CascadeOutcome::Resolved(LoadResult::Item {
                        catalog,
                        collection,
                        item,
                    });
                }
                Ok(item) => {
                    debug!(expected = item_id, got = %item.id, "item id mismatch");
                    not_found
                }
                Err(err) => LoadErrorKind::TransportFailure {
                    level: ViewMode::Item,
                    source: FetchError::Decode {
                        url,
                        message: err.to_string(),
                    },
                },
            },
            Err(err) if err.is_not_found() => not_found,
            Err(source) => LoadErrorKind::TransportFailure {
                level: ViewMode::Item,
                source,
            },
        };
        failed(
            kind,
            LoadResult::Collection {
                catalog,
                collection,
            },
        )
    }

    /// Walks the collections listing, following `rel=next`, until the id is
    /// found or the page budget runs out.
    async fn find_collection(
        &self,
        catalog: &CatalogDescriptor,
        collection_id: &str,
        token: &CascadeToken,
    ) -> Result<Option<CollectionSummary>, Interrupted> {
        let mut url = catalog.endpoint.collections_url.clone();
        for page_number in 1..=self.max_collection_pages {
            if token.is_stale() {
                return Err(Interrupted::Superseded);
            }
            debug!(%url, page_number, generation = token.generation(), "fetching collections");
            let response = self.fetch.get_json(&url).await;
            if token.is_stale() {
                return Err(Interrupted::Superseded);
            }

            let page = CollectionsPage::from_value(response.map_err(Interrupted::Transport)?)
                .map_err(|err| {
                    Interrupted::Transport(FetchError::Decode {
                        url: url.clone(),
                        message: err.to_string(),
                    })
                })?;
            if let Some(found) = page.find(collection_id) {
                return Ok(Some(found.clone()));
            }
            match page.next_href() {
                Some(next) => {
                    let next = resolve_href(&url, next).map_err(|err| {
                        Interrupted::Transport(FetchError::Decode {
                            url: url.clone(),
                            message: format!("bad next link `{next}`: {err}"),
                        })
                    })?;
                    if next == url {
                        return Ok(None);
                    }
                    url = next;
                }
                None => return Ok(None),
            }
        }
        debug!(
            collection_id,
            pages = self.max_collection_pages,
            "collection not found within page limit"
        );
        Ok(None)
    }
}

fn failed(kind: LoadErrorKind, partial: LoadResult) -> CascadeOutcome {
    CascadeOutcome::Failed(LoadError { kind, partial })
}

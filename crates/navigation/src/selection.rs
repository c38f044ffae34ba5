use catalog::{CatalogDescriptor, CollectionSummary, ItemSummary};
use routing::Viewport;
use serde::Serialize;

use crate::loader::LoadResult;

/// Notifications for the list and map panels once a resource is known.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionEvent {
    /// Map camera taken from the URL on startup.
    Location { lat: f64, lng: f64, zoom: f64 },
    Catalog { catalog: CatalogDescriptor },
    Collection {
        catalog_id: String,
        collection: CollectionSummary,
    },
    Item {
        catalog_id: String,
        collection_id: String,
        item: ItemSummary,
    },
}

impl SelectionEvent {
    pub fn location(viewport: Viewport) -> Self {
        SelectionEvent::Location {
            lat: viewport.center.lat,
            lng: viewport.center.lng,
            zoom: viewport.zoom,
        }
    }

    /// One event per resolved level, parent first.
    pub fn from_result(result: &LoadResult) -> Vec<SelectionEvent> {
        let mut events = Vec::new();
        if let Some(catalog) = result.catalog() {
            events.push(SelectionEvent::Catalog {
                catalog: catalog.clone(),
            });
            if let Some(collection) = result.collection() {
                events.push(SelectionEvent::Collection {
                    catalog_id: catalog.id.clone(),
                    collection: collection.clone(),
                });
                if let Some(item) = result.item() {
                    events.push(SelectionEvent::Item {
                        catalog_id: catalog.id.clone(),
                        collection_id: collection.id.clone(),
                        item: item.clone(),
                    });
                }
            }
        }
        events
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SelectionEvent::Location { .. } => "location",
            SelectionEvent::Catalog { .. } => "catalog",
            SelectionEvent::Collection { .. } => "collection",
            SelectionEvent::Item { .. } => "item",
        }
    }
}

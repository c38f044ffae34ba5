use routing::{RouteDescriptor, RouteKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Root,
    Catalog,
    Collection,
    Item,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        RouteKind::from(self).as_str()
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RouteKind> for ViewMode {
    fn from(kind: RouteKind) -> Self {
        match kind {
            RouteKind::Root => ViewMode::Root,
            RouteKind::Catalog => ViewMode::Catalog,
            RouteKind::Collection => ViewMode::Collection,
            RouteKind::Item => ViewMode::Item,
        }
    }
}

impl From<ViewMode> for RouteKind {
    fn from(mode: ViewMode) -> Self {
        match mode {
            ViewMode::Root => RouteKind::Root,
            ViewMode::Catalog => RouteKind::Catalog,
            ViewMode::Collection => RouteKind::Collection,
            ViewMode::Item => RouteKind::Item,
        }
    }
}

/// A requested state change, as sent by UI collaborators.
///
/// Any combination of fields is accepted; [`NavigationState::from_update`]
/// enforces the hierarchy. Empty strings count as absent. `view_mode` can
/// only make the result shallower than the supplied ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationUpdate {
    #[serde(default)]
    pub view_mode: Option<ViewMode>,
    #[serde(default)]
    pub catalog_id: Option<String>,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
}

impl NavigationUpdate {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn catalog(catalog_id: impl Into<String>) -> Self {
        Self {
            catalog_id: Some(catalog_id.into()),
            ..Self::default()
        }
    }

    pub fn with_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub fn with_item(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }
}

/// Where the user is in the catalog hierarchy.
///
/// Invariants: `collection_id` implies `catalog_id`, `item_id` implies
/// `collection_id`, and `view_mode` names the deepest populated level.
/// The fields are private so no value can break them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "NavigationUpdate")]
pub struct NavigationState {
    view_mode: ViewMode,
    catalog_id: Option<String>,
    collection_id: Option<String>,
    item_id: Option<String>,
}

impl NavigationState {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn catalog(catalog_id: impl Into<String>) -> Self {
        Self::from_update(NavigationUpdate::catalog(catalog_id))
    }

    pub fn collection(catalog_id: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self::from_update(NavigationUpdate::catalog(catalog_id).with_collection(collection_id))
    }

    pub fn item(
        catalog_id: impl Into<String>,
        collection_id: impl Into<String>,
        item_id: impl Into<String>,
    ) -> Self {
        Self::from_update(
            NavigationUpdate::catalog(catalog_id)
                .with_collection(collection_id)
                .with_item(item_id),
        )
    }

    /// Replaces the whole state with `update`, truncating anything whose
    /// parent is missing.
    pub fn from_update(update: NavigationUpdate) -> Self {
        fn present(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }

        let catalog_id = present(update.catalog_id);
        let collection_id = catalog_id.as_ref().and(present(update.collection_id));
        let item_id = collection_id.as_ref().and(present(update.item_id));

        let mut state = Self {
            view_mode: ViewMode::Root,
            catalog_id,
            collection_id,
            item_id,
        };
        state.view_mode = state.deepest();
        match update.view_mode {
            Some(mode) if mode < state.view_mode => state.truncate_to(mode),
            _ => state,
        }
    }

    pub fn from_route(route: &RouteDescriptor) -> Self {
        Self::from_update(NavigationUpdate {
            view_mode: None,
            catalog_id: route.catalog_id().map(str::to_string),
            collection_id: route.collection_id().map(str::to_string),
            item_id: route.item_id().map(str::to_string),
        })
    }

    fn deepest(&self) -> ViewMode {
        match (&self.catalog_id, &self.collection_id, &self.item_id) {
            (Some(_), Some(_), Some(_)) => ViewMode::Item,
            (Some(_), Some(_), None) => ViewMode::Collection,
            (Some(_), None, _) => ViewMode::Catalog,
            (None, _, _) => ViewMode::Root,
        }
    }

    fn truncate_to(mut self, mode: ViewMode) -> Self {
        if mode < ViewMode::Item {
            self.item_id = None;
        }
        if mode < ViewMode::Collection {
            self.collection_id = None;
        }
        if mode < ViewMode::Catalog {
            self.catalog_id = None;
        }
        self.view_mode = mode;
        self
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn catalog_id(&self) -> Option<&str> {
        self.catalog_id.as_deref()
    }

    pub fn collection_id(&self) -> Option<&str> {
        self.collection_id.as_deref()
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn to_route(&self) -> RouteDescriptor {
        RouteDescriptor::from_ids(self.catalog_id(), self.collection_id(), self.item_id())
    }
}

impl From<NavigationUpdate> for NavigationState {
    fn from(update: NavigationUpdate) -> Self {
        Self::from_update(update)
    }
}

impl From<NavigationState> for NavigationUpdate {
    fn from(state: NavigationState) -> Self {
        Self {
            view_mode: Some(state.view_mode),
            catalog_id: state.catalog_id,
            collection_id: state.collection_id,
            item_id: state.item_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn orphans_are_dropped() {
        let s = NavigationState::from_update(NavigationUpdate {
            view_mode: None,
            catalog_id: None,
            collection_id: Some("c".to_string()),
            item_id: Some("i".to_string()),
        });
        assert_eq!(s, NavigationState::root());

        let s = NavigationState::from_update(NavigationUpdate::catalog("a").with_item("i"));
        assert_eq!(s, NavigationState::catalog("a"));
        assert_eq!(s.view_mode(), ViewMode::Catalog);
    }

    #[test]
    fn empty_ids_count_as_absent() {
        let s = NavigationState::from_update(NavigationUpdate::catalog("a").with_collection(""));
        assert_eq!(s, NavigationState::catalog("a"));
    }

    #[test]
    fn view_mode_only_truncates() {
        let mut u = NavigationUpdate::catalog("a").with_collection("b").with_item("c");
        u.view_mode = Some(ViewMode::Catalog);
        assert_eq!(NavigationState::from_update(u), NavigationState::catalog("a"));

        let mut u = NavigationUpdate::catalog("a");
        u.view_mode = Some(ViewMode::Item);
        assert_eq!(NavigationState::from_update(u).view_mode(), ViewMode::Catalog);
    }

    #[test]
    fn route_round_trip() {
        let s = NavigationState::item("a", "b", "c");
        assert_eq!(NavigationState::from_route(&s.to_route()), s);
    }

    #[test]
    fn serializes_camel_case_and_validates_on_read() {
        let s = NavigationState::collection("element84", "sentinel-2");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "viewMode": "collection",
                "catalogId": "element84",
                "collectionId": "sentinel-2",
                "itemId": null
            })
        );

        let orphan: NavigationState =
            serde_json::from_str(r#"{"viewMode":"item","itemId":"x"}"#).unwrap();
        assert_eq!(orphan, NavigationState::root());
    }
}

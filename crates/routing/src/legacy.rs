//! Pre-path deep links carried the hierarchy in query parameters
//! (`?vm=collection&cid=element84&col=sentinel-2`). They are still honoured
//! on load; once the path carries the ids the parameters are dropped.

use crate::location::QueryParams;
use crate::matcher::{RouteDescriptor, RouteKind};

pub const VIEW_MODE_KEY: &str = "vm";
pub const CATALOG_KEY: &str = "cid";
pub const COLLECTION_KEY: &str = "col";
pub const ITEM_KEY: &str = "itm";

pub const LEGACY_KEYS: [&str; 4] = [VIEW_MODE_KEY, CATALOG_KEY, COLLECTION_KEY, ITEM_KEY];

fn non_empty<'a>(query: &'a QueryParams, key: &str) -> Option<&'a str> {
    query.get(key).map(str::trim).filter(|v| !v.is_empty())
}

/// Route encoded by legacy parameters, if `cid` is present. `vm` can only
/// make the route shallower, never deeper than the ids allow.
pub fn route_from_legacy_query(query: &QueryParams) -> Option<RouteDescriptor> {
    let catalog = non_empty(query, CATALOG_KEY)?;
    let route = RouteDescriptor::from_ids(
        Some(catalog),
        non_empty(query, COLLECTION_KEY),
        non_empty(query, ITEM_KEY),
    );
    match query.get(VIEW_MODE_KEY).and_then(RouteKind::parse) {
        Some(vm) => Some(route.truncated(vm.max(RouteKind::Catalog))),
        None => Some(route),
    }
}

/// Removes the legacy hierarchy parameters, returning whether any existed.
pub fn strip_legacy_keys(query: &mut QueryParams) -> bool {
    let mut removed = false;
    for key in LEGACY_KEYS {
        removed |= query.remove(key);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_full_hierarchy() {
        let q = QueryParams::parse("cid=element84&col=sentinel-2&itm=S2A_1");
        assert_eq!(
            route_from_legacy_query(&q),
            Some(RouteDescriptor::item("element84", "sentinel-2", "S2A_1"))
        );
    }

    #[test]
    fn view_mode_truncates() {
        let q = QueryParams::parse("vm=catalog&cid=element84&col=sentinel-2");
        assert_eq!(
            route_from_legacy_query(&q),
            Some(RouteDescriptor::catalog("element84"))
        );

        let q = QueryParams::parse("vm=item&cid=element84&col=sentinel-2");
        assert_eq!(
            route_from_legacy_query(&q),
            Some(RouteDescriptor::collection("element84", "sentinel-2"))
        );
    }

    #[test]
    fn requires_catalog() {
        assert_eq!(route_from_legacy_query(&QueryParams::parse("col=x")), None);
        assert_eq!(route_from_legacy_query(&QueryParams::parse("cid=")), None);
    }

    #[test]
    fn orphan_item_is_dropped() {
        let q = QueryParams::parse("cid=a&itm=b");
        assert_eq!(route_from_legacy_query(&q), Some(RouteDescriptor::catalog("a")));
    }

    #[test]
    fn strips_only_legacy_keys() {
        let mut q = QueryParams::parse("vm=item&cid=a&mapZoom=3.00&col=b&itm=c");
        assert!(strip_legacy_keys(&mut q));
        assert_eq!(q.to_query_string(), "mapZoom=3.00");
        assert!(!strip_legacy_keys(&mut q));
    }
}

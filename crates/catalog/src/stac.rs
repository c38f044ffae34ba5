//! The slices of STAC API documents the browser needs to resolve ids.
//!
//! Unknown fields are kept in `extra` so list and map collaborators receive
//! the full document alongside the typed identifiers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One page of `GET {collections_url}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionsPage {
    #[serde(default)]
    pub collections: Vec<CollectionSummary>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl CollectionsPage {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn find(&self, collection_id: &str) -> Option<&CollectionSummary> {
        self.collections.iter().find(|c| c.id == collection_id)
    }

    pub fn next_href(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == "next")
            .map(|l| l.href.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(default)]
    pub properties: Value,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ItemSummary {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn datetime(&self) -> Option<&str> {
        self.properties.get("datetime").and_then(Value::as_str)
    }
}

/// Resolves a link `href` against the URL of the document that contained it.
pub fn resolve_href(base: &str, href: &str) -> Result<String, url::ParseError> {
    Ok(Url::parse(base)?.join(href)?.into())
}

#[cfg(test)]
mod tests {
    use super::{CollectionsPage, ItemSummary, resolve_href};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_collections_page_and_next_link() {
        let page = CollectionsPage::from_value(json!({
            "collections": [
                {"id": "sentinel-2-l2a", "title": "Sentinel-2 L2A", "license": "proprietary"},
                {"id": "landsat-c2-l2"}
            ],
            "links": [
                {"rel": "self", "href": "https://x/collections"},
                {"rel": "next", "href": "https://x/collections?token=2"}
            ]
        }))
        .unwrap();

        let s2 = page.find("sentinel-2-l2a").unwrap();
        assert_eq!(s2.title.as_deref(), Some("Sentinel-2 L2A"));
        assert_eq!(s2.extra.get("license"), Some(&json!("proprietary")));
        assert!(page.find("missing").is_none());
        assert_eq!(page.next_href(), Some("https://x/collections?token=2"));
    }

    #[test]
    fn missing_arrays_default_to_empty() {
        let page = CollectionsPage::from_value(json!({})).unwrap();
        assert!(page.collections.is_empty());
        assert_eq!(page.next_href(), None);
    }

    #[test]
    fn item_requires_id() {
        assert!(ItemSummary::from_value(json!({"type": "Feature"})).is_err());

        let item = ItemSummary::from_value(json!({
            "type": "Feature",
            "id": "S2A_1",
            "collection": "sentinel-2-l2a",
            "bbox": [0.0, 1.0, 2.0, 3.0],
            "properties": {"datetime": "2024-01-01T00:00:00Z"}
        }))
        .unwrap();
        assert_eq!(item.datetime(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(item.extra.get("type"), Some(&json!("Feature")));
    }

    #[test]
    fn resolves_relative_hrefs() {
        let base = "https://x.example/api/collections";
        let resolve = |href| resolve_href(base, href).unwrap();
        assert_eq!(resolve("https://y.example/z"), "https://y.example/z");
        assert_eq!(resolve("/other?page=2"), "https://x.example/other?page=2");
        assert_eq!(
            resolve("collections?page=2"),
            "https://x.example/api/collections?page=2"
        );
        assert_eq!(resolve("?page=2"), "https://x.example/api/collections?page=2");
        assert_eq!(resolve("../v2/collections"), "https://x.example/v2/collections");
        assert_eq!(
            resolve("collections?next=https://elsewhere/x"),
            "https://x.example/api/collections?next=https://elsewhere/x"
        );
    }

    #[test]
    fn base_query_does_not_leak_into_relative_hrefs() {
        assert_eq!(
            resolve_href(
                "https://x.example/api/collections?token=a/b",
                "collections?page=3"
            )
            .unwrap(),
            "https://x.example/api/collections?page=3"
        );
    }

    #[test]
    fn unparseable_base_is_an_error() {
        assert!(resolve_href("not a url", "?page=2").is_err());
    }
}

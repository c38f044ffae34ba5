use foundation::percent::{decode_segment, encode_segment};
use serde::{Deserialize, Serialize};

/// Depth of a route in the catalog hierarchy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Root,
    Catalog,
    Collection,
    Item,
}

impl RouteKind {
    pub fn depth(self) -> usize {
        match self {
            RouteKind::Root => 0,
            RouteKind::Catalog => 1,
            RouteKind::Collection => 2,
            RouteKind::Item => 3,
        }
    }

    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 => RouteKind::Root,
            1 => RouteKind::Catalog,
            2 => RouteKind::Collection,
            _ => RouteKind::Item,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteKind::Root => "root",
            RouteKind::Catalog => "catalog",
            RouteKind::Collection => "collection",
            RouteKind::Item => "item",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "root" => Some(RouteKind::Root),
            "catalog" => Some(RouteKind::Catalog),
            "collection" => Some(RouteKind::Collection),
            "item" => Some(RouteKind::Item),
            _ => None,
        }
    }
}

impl std::fmt::Display for RouteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed navigation target: the route kind plus its decoded id segments
/// (catalog, collection, item, as many as the kind needs).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteDescriptor {
    kind: RouteKind,
    raw_segments: Vec<String>,
}

impl RouteDescriptor {
    pub fn root() -> Self {
        Self {
            kind: RouteKind::Root,
            raw_segments: Vec::new(),
        }
    }

    pub fn catalog(catalog_id: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::Catalog,
            raw_segments: vec![catalog_id.into()],
        }
    }

    pub fn collection(catalog_id: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::Collection,
            raw_segments: vec![catalog_id.into(), collection_id.into()],
        }
    }

    pub fn item(
        catalog_id: impl Into<String>,
        collection_id: impl Into<String>,
        item_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: RouteKind::Item,
            raw_segments: vec![catalog_id.into(), collection_id.into(), item_id.into()],
        }
    }

    /// Builds the deepest route the ids support; a missing parent drops
    /// every child below it.
    pub fn from_ids(catalog: Option<&str>, collection: Option<&str>, item: Option<&str>) -> Self {
        match (catalog, collection, item) {
            (Some(c), Some(col), Some(i)) => Self::item(c, col, i),
            (Some(c), Some(col), None) => Self::collection(c, col),
            (Some(c), None, _) => Self::catalog(c),
            (None, _, _) => Self::root(),
        }
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    pub fn raw_segments(&self) -> &[String] {
        &self.raw_segments
    }

    pub fn catalog_id(&self) -> Option<&str> {
        self.raw_segments.first().map(String::as_str)
    }

    pub fn collection_id(&self) -> Option<&str> {
        self.raw_segments.get(1).map(String::as_str)
    }

    pub fn item_id(&self) -> Option<&str> {
        self.raw_segments.get(2).map(String::as_str)
    }

    /// Keeps at most `kind`'s depth of segments.
    pub fn truncated(mut self, kind: RouteKind) -> Self {
        if kind.depth() < self.kind.depth() {
            self.raw_segments.truncate(kind.depth());
            self.kind = kind;
        }
        self
    }

    /// Canonical path for this route under `base_path`.
    pub fn to_path(&self, base_path: &str) -> String {
        let base = normalize_base_path(base_path);
        if self.kind == RouteKind::Root {
            return if base.is_empty() { "/".to_string() } else { base };
        }

        let mut out = base;
        for (literal, segment) in ["catalog", "collection", "item"].iter().zip(&self.raw_segments) {
            out.push('/');
            out.push_str(literal);
            out.push('/');
            out.push_str(&encode_segment(segment));
        }
        out
    }
}

#[derive(Debug, Copy, Clone)]
enum Part {
    Literal(&'static str),
    Capture,
}

use Part::{Capture, Literal};

/// Most specific first. The root route has no segments and is handled
/// before pattern matching.
const PATTERNS: &[(RouteKind, &[Part])] = &[
    (
        RouteKind::Item,
        &[
            Literal("catalog"),
            Capture,
            Literal("collection"),
            Capture,
            Literal("item"),
            Capture,
        ],
    ),
    (
        RouteKind::Collection,
        &[Literal("catalog"), Capture, Literal("collection"), Capture],
    ),
    (RouteKind::Catalog, &[Literal("catalog"), Capture]),
];

/// `""`, `"/"` → `""`; otherwise a leading slash and no trailing slash.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Maps URL paths onto [`RouteDescriptor`]s.
///
/// Pure and synchronous. Paths that match none of the patterns yield `None`
/// and are simply not handled by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatcher {
    base_path: String,
}

impl RouteMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts the route grammar under a prefix such as `/browser`.
    pub fn with_base_path(base_path: &str) -> Self {
        Self {
            base_path: normalize_base_path(base_path),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn match_path(&self, path: &str) -> Option<RouteDescriptor> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let rest = self.strip_base(path)?;

        // One trailing slash is tolerated (`/catalog/x/`).
        let rest = match rest.strip_suffix('/') {
            Some(r) if !r.is_empty() => r,
            _ => rest,
        };
        if rest.is_empty() || rest == "/" || rest == "/index.html" {
            return Some(RouteDescriptor::root());
        }

        let body = rest.strip_prefix('/')?;
        let segments: Vec<&str> = body.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        PATTERNS
            .iter()
            .find_map(|(kind, parts)| match_pattern(*kind, parts, &segments))
    }

    fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.base_path.is_empty() {
            return Some(path);
        }
        let rest = path.strip_prefix(self.base_path.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }

    pub fn path_for(&self, route: &RouteDescriptor) -> String {
        route.to_path(&self.base_path)
    }
}

fn match_pattern(kind: RouteKind, parts: &[Part], segments: &[&str]) -> Option<RouteDescriptor> {
    if parts.len() != segments.len() {
        return None;
    }
    let mut raw_segments = Vec::with_capacity(kind.depth());
    for (part, segment) in parts.iter().zip(segments) {
        match part {
            Literal(lit) if lit == segment => {}
            Literal(_) => return None,
            Capture => raw_segments.push(decode_segment(segment).ok()?),
        }
    }
    Some(RouteDescriptor { kind, raw_segments })
}

/// Matches `path` with no mount prefix.
pub fn match_path(path: &str) -> Option<RouteDescriptor> {
    RouteMatcher::new().match_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn matches_each_pattern() {
        assert_eq!(match_path("/"), Some(RouteDescriptor::root()));
        assert_eq!(match_path(""), Some(RouteDescriptor::root()));
        assert_eq!(
            match_path("/catalog/element84"),
            Some(RouteDescriptor::catalog("element84"))
        );
        assert_eq!(
            match_path("/catalog/element84/collection/sentinel-2"),
            Some(RouteDescriptor::collection("element84", "sentinel-2"))
        );
        assert_eq!(
            match_path("/catalog/planetary/collection/landsat-c2-l2/item/LC08_1"),
            Some(RouteDescriptor::item("planetary", "landsat-c2-l2", "LC08_1"))
        );
    }

    #[test]
    fn decodes_segments() {
        let r = match_path("/catalog/a%20b/collection/c%2Fd").unwrap();
        assert_eq!(r.catalog_id(), Some("a b"));
        assert_eq!(r.collection_id(), Some("c/d"));
        assert_eq!(r.item_id(), None);
    }

    #[test]
    fn ignores_unknown_and_malformed_paths() {
        assert_eq!(match_path("/about"), None);
        assert_eq!(match_path("/catalog"), None);
        assert_eq!(match_path("/catalog//collection/x"), None);
        assert_eq!(match_path("/catalog/a/items/b"), None);
        assert_eq!(match_path("/catalog/a/collection/b/item/c/extra"), None);
        assert_eq!(match_path("/catalog/%zz"), None);
        assert_eq!(match_path("catalog/a"), None);
    }

    #[test]
    fn tolerates_trailing_slash_query_and_index() {
        assert_eq!(match_path("/catalog/a/"), Some(RouteDescriptor::catalog("a")));
        assert_eq!(
            match_path("/catalog/a?mapZoom=3#x"),
            Some(RouteDescriptor::catalog("a"))
        );
        assert_eq!(match_path("/index.html"), Some(RouteDescriptor::root()));
        assert_eq!(match_path("/catalog/a//"), None);
    }

    #[test]
    fn base_path_is_stripped() {
        let m = RouteMatcher::with_base_path("browser/");
        assert_eq!(m.base_path(), "/browser");
        assert_eq!(m.match_path("/browser"), Some(RouteDescriptor::root()));
        assert_eq!(m.match_path("/browser/"), Some(RouteDescriptor::root()));
        assert_eq!(
            m.match_path("/browser/catalog/x"),
            Some(RouteDescriptor::catalog("x"))
        );
        assert_eq!(m.match_path("/browserx/catalog/x"), None);
        assert_eq!(m.match_path("/catalog/x"), None);

        assert_eq!(m.path_for(&RouteDescriptor::root()), "/browser");
        assert_eq!(
            m.path_for(&RouteDescriptor::catalog("x")),
            "/browser/catalog/x"
        );
    }

    #[test]
    fn encoder_produces_canonical_paths() {
        assert_eq!(RouteDescriptor::root().to_path(""), "/");
        assert_eq!(
            RouteDescriptor::item("a", "b c", "d/e").to_path(""),
            "/catalog/a/collection/b%20c/item/d%2Fe"
        );
    }

    #[test]
    fn from_ids_truncates_orphans() {
        assert_eq!(
            RouteDescriptor::from_ids(None, Some("x"), Some("y")),
            RouteDescriptor::root()
        );
        assert_eq!(
            RouteDescriptor::from_ids(Some("a"), None, Some("y")),
            RouteDescriptor::catalog("a")
        );
        assert_eq!(
            RouteDescriptor::item("a", "b", "c").truncated(RouteKind::Catalog),
            RouteDescriptor::catalog("a")
        );
    }

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9._~ %/+:-]{1,16}"
    }

    proptest! {
        #[test]
        fn encoded_routes_match_back(c in segment(), col in segment(), item in segment(), depth in 0usize..4) {
            let route = RouteDescriptor::item(c, col, item).truncated(RouteKind::from_depth(depth));
            let path = route.to_path("");
            let matched = match_path(&path);
            prop_assert_eq!(matched.as_ref(), Some(&route));
            prop_assert_eq!(matched.unwrap().raw_segments().len(), depth);
        }

        #[test]
        fn foreign_prefixes_never_match(first in "[a-z]{1,10}", rest in "(/[a-z0-9]{1,8}){0,5}") {
            prop_assume!(first != "catalog" && first != "index.html");
            let path = format!("/{first}{rest}");
            prop_assert_eq!(match_path(&path), None);
        }
    }
}

use foundation::percent::{decode_query_component, encode_query_component};

/// Ordered query parameters. Keys may repeat in parsed input; `set`
/// collapses duplicates of the key it writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `a=1&b=two` (a leading `?` is ignored). Components that fail
    /// to decode are kept verbatim rather than dropped.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                let k = decode_query_component(k).unwrap_or_else(|_| k.to_string());
                let v = decode_query_component(v).unwrap_or_else(|_| v.to_string());
                (k, v)
            })
            .collect();
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Overwrites the first occurrence in place (keeping its position) or
    /// appends.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(idx) => {
                self.pairs[idx].1 = value;
                let mut seen = 0usize;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|(k, _)| k != key);
        self.pairs.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encoded form without the leading `?`.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    encode_query_component(k),
                    encode_query_component(v)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Path, query and fragment of the current document URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: QueryParams,
    pub fragment: Option<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Accepts either an origin-relative URL (`/a?b#c`) or an absolute one,
    /// in which case scheme and authority are discarded.
    pub fn parse(url: &str) -> Self {
        let mut rest = url.trim();
        if let Some(idx) = rest.find("://") {
            let after = &rest[idx + 3..];
            rest = after.find('/').map(|i| &after[i..]).unwrap_or("/");
        }

        let (rest, fragment) = match rest.split_once('#') {
            Some((r, f)) => (r, Some(f.to_string())),
            None => (rest, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((p, q)) => (p, QueryParams::parse(q)),
            None => (rest, QueryParams::new()),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            path: path.to_string(),
            query,
            fragment,
        }
    }

    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: self.query.clone(),
            fragment: self.fragment.clone(),
        }
    }

    pub fn to_url(&self) -> String {
        let mut out = self.path.clone();
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query.to_query_string());
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

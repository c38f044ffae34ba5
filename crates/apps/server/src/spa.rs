//! Static file serving with single-page-app fallbacks.
//!
//! Client-side routes (`/catalog/...`, `/browser/...`, `/view/...`) and the
//! root all get `index.html` so a deep link or reload lands in the app,
//! which then resolves the URL itself.

use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use foundation::percent::decode_segment;
use tracing::{debug, warn};

const STATIC_EXTENSIONS: &[&str] = &[
    "html", "css", "js", "mjs", "json", "png", "jpg", "jpeg", "gif", "svg", "ico", "woff",
    "woff2", "ttf", "eot", "map", "wasm",
];

const SPA_PREFIXES: &[&str] = &["catalog", "browser", "view"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaTarget {
    /// Serve this file (relative to the root) or 404.
    File(PathBuf),
    Index,
    /// Malformed or escaping path.
    Reject,
}

/// Decides what a request path maps to. Paths with a known static
/// extension are always served as files, even under an SPA prefix.
pub fn classify(request_path: &str) -> SpaTarget {
    let Ok(decoded) = decode_segment(request_path) else {
        return SpaTarget::Reject;
    };
    let clean = decoded.trim_start_matches('/');
    if clean.is_empty() || clean == "index.html" {
        return SpaTarget::Index;
    }

    let relative = PathBuf::from(clean);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return SpaTarget::Reject;
    }

    if has_static_extension(&relative) {
        return SpaTarget::File(relative);
    }
    let first = clean.split('/').next().unwrap_or("");
    if SPA_PREFIXES.contains(&first) {
        return SpaTarget::Index;
    }
    SpaTarget::File(relative)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn has_static_extension(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| STATIC_EXTENSIONS.contains(&ext.as_str()))
}

pub fn content_type_for(path: &Path) -> &'static str {
    match extension_of(path).as_deref() {
        Some("html") => "text/html; charset=utf-8",
        Some("js" | "mjs") => "application/javascript",
        Some("json" | "map") => "application/json",
        Some("css") => "text/css",
        Some("wasm") => "application/wasm",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("eot") => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}

/// Resolves `uri` under `root` and builds the response.
pub async fn respond(root: &Path, method: &Method, uri: &Uri) -> Response {
    if *method != Method::GET && *method != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response();
    }
    match classify(uri.path()) {
        SpaTarget::Index => {
            debug!(path = uri.path(), "serving index.html");
            serve_file(&root.join("index.html")).await
        }
        SpaTarget::File(relative) => serve_file(&root.join(relative)).await,
        SpaTarget::Reject => (StatusCode::BAD_REQUEST, "invalid path").into_response(),
    }
}

async fn serve_file(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(data) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static(content_type_for(path)),
            );
            (StatusCode::OK, headers, Body::from(data)).into_response()
        }
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("file read failed: {path:?} -> {err}");
            }
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use catalog::{CatalogError, CatalogRegistry, RegistryConfig};
use clap::{Parser, Subcommand};
use navigation::{ConfigError, SynchronizerConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod resolve;
mod spa;

use resolve::ReqwestFetch;

#[derive(Parser, Debug)]
#[command(author, version, about = "STAC browser server and route resolver")]
struct Args {
    /// Catalog registry JSON file (default: $ATLAS_REGISTRY, else the built-in table)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the browser app with SPA routing
    Serve {
        /// Port to listen on (default: $ATLAS_PORT, else 8000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Directory containing index.html (default: $ATLAS_ROOT, else the cwd)
        #[arg(long, short)]
        directory: Option<PathBuf>,
    },

    /// Resolve a browser URL against the live catalogs and print the result as JSON
    Resolve {
        /// Path and query, e.g. /catalog/element84/collection/sentinel-2
        url: String,

        /// Synchronizer config JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the active catalog registry as JSON
    Catalogs,
}

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Registry(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Clone)]
struct AppState {
    root: Arc<PathBuf>,
    catalogs: Arc<RegistryConfig>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = real_main(Args::parse()).await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<(), ServerError> {
    let registry = load_registry(args.registry.or_else(|| env_var_path("ATLAS_REGISTRY")))?;

    match args.command {
        Command::Serve { port, directory } => {
            let port = port.unwrap_or_else(|| env_var_u16("ATLAS_PORT", 8000));
            let root = directory
                .or_else(|| env_var_path("ATLAS_ROOT"))
                .unwrap_or_else(|| PathBuf::from("."));
            serve(port, root, registry.config()).await
        }
        Command::Resolve { url, config } => {
            let config = match config {
                Some(path) => SynchronizerConfig::from_json_str(&read_file(&path)?)?,
                None => SynchronizerConfig::default(),
            };
            let fetch = ReqwestFetch::new(reqwest::Client::new());
            let report = resolve::resolve(&url, registry, fetch, config).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Catalogs => {
            println!("{}", registry.config().to_json_string()?);
            Ok(())
        }
    }
}

fn read_file(path: &Path) -> Result<String, ServerError> {
    std::fs::read_to_string(path).map_err(|source| ServerError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_registry(path: Option<PathBuf>) -> Result<CatalogRegistry, ServerError> {
    match path {
        Some(path) => {
            let registry = CatalogRegistry::from_json_str(&read_file(&path)?)?;
            info!("loaded catalog registry from {path:?}");
            Ok(registry)
        }
        None => Ok(CatalogRegistry::builtin()),
    }
}

async fn serve(port: u16, root: PathBuf, catalogs: RegistryConfig) -> Result<(), ServerError> {
    if tokio::fs::metadata(root.join("index.html")).await.is_err() {
        warn!("index.html not found in {root:?}; SPA routes will 404");
    }

    let state = AppState {
        root: Arc::new(root),
        catalogs: Arc::new(catalogs),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/catalogs", get(get_catalogs))
        .fallback(serve_spa)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!("STAC browser server listening on http://{addr}");
    info!("serving directory: {:?}", state.root);
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_catalogs(State(state): State<AppState>) -> Response {
    let body = match state.catalogs.to_json_string() {
        Ok(v) => v,
        Err(err) => {
            error!("registry serialization failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "registry error").into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    (StatusCode::OK, headers, Body::from(body)).into_response()
}

async fn serve_spa(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    spa::respond(&state.root, &method, &uri).await
}

fn env_var_u16(key: &str, default: u16) -> u16 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

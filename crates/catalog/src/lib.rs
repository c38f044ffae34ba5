//! Known STAC catalogs and the documents fetched from them.
//!
//! The registry is a pure lookup: it maps a catalog id (or a legacy alias) to
//! an endpoint descriptor without touching the network.

mod config;
mod registry;
pub mod stac;

pub use config::{CatalogSpec, RegistryConfig};
pub use registry::{CatalogDescriptor, CatalogEndpoint, CatalogRegistry};
pub use stac::{CollectionSummary, CollectionsPage, ItemSummary, Link};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog `{catalog_id}` not found")]
    NotFound { catalog_id: String },
    #[error("duplicate catalog id `{0}`")]
    DuplicateCatalog(String),
    #[error("alias `{alias}` points at unknown catalog `{target}`")]
    DanglingAlias { alias: String, target: String },
    #[error("alias `{0}` shadows a catalog id")]
    AliasShadowsCatalog(String),
    #[error("invalid registry config: {0}")]
    InvalidConfig(String),
    #[error("registry config is corrupt: {0}")]
    Corrupt(String),
}

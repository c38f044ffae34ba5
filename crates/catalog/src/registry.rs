use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use foundation::percent::encode_segment;
use serde::{Deserialize, Serialize};

use crate::CatalogError;
use crate::config::{CatalogSpec, RegistryConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEndpoint {
    pub root: String,
    pub collections_url: String,
    pub search_url: String,
}

impl CatalogEndpoint {
    fn from_spec(spec: &CatalogSpec) -> Self {
        let root = spec.root.trim_end_matches('/').to_string();
        let collections_url = spec
            .collections_url
            .clone()
            .unwrap_or_else(|| format!("{root}/collections"));
        let search_url = spec
            .search_url
            .clone()
            .unwrap_or_else(|| format!("{root}/search"));
        Self {
            root,
            collections_url: collections_url.trim_end_matches('/').to_string(),
            search_url,
        }
    }

    /// `{collections}/{collection_id}/items/{item_id}`, segments percent-encoded.
    pub fn item_url(&self, collection_id: &str, item_id: &str) -> String {
        format!(
            "{}/{}/items/{}",
            self.collections_url,
            encode_segment(collection_id),
            encode_segment(item_id)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDescriptor {
    pub id: String,
    pub display_name: String,
    pub endpoint: CatalogEndpoint,
    /// Legacy identifiers that resolve to this catalog.
    pub aliases_of: BTreeSet<String>,
}

/// Resolves catalog ids and legacy aliases to endpoint descriptors.
///
/// Descriptors are built on first resolution and cached until [`reset`].
/// Lookups are deterministic and total: every id either resolves or fails
/// with [`CatalogError::NotFound`].
///
/// [`reset`]: CatalogRegistry::reset
#[derive(Debug)]
pub struct CatalogRegistry {
    catalogs: BTreeMap<String, CatalogSpec>,
    aliases: BTreeMap<String, String>,
    cache: RefCell<BTreeMap<String, CatalogDescriptor>>,
}

impl Default for CatalogRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CatalogRegistry {
    pub fn builtin() -> Self {
        Self::from_validated(RegistryConfig::builtin())
    }

    pub fn from_config(config: RegistryConfig) -> Result<Self, CatalogError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::from_config(RegistryConfig::from_json_str(json)?)
    }

    fn from_validated(config: RegistryConfig) -> Self {
        let catalogs = config
            .catalogs
            .into_iter()
            .map(|spec| (spec.id.clone(), spec))
            .collect();
        Self {
            catalogs,
            aliases: config.aliases,
            cache: RefCell::new(BTreeMap::new()),
        }
    }

    /// Snapshot of the registry contents, e.g. for serving to clients.
    pub fn config(&self) -> RegistryConfig {
        RegistryConfig {
            catalogs: self.catalogs.values().cloned().collect(),
            aliases: self.aliases.clone(),
        }
    }

    pub fn known_ids(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(|s| s.as_str())
    }

    /// Maps `catalog_id` to the id it is served under, following at most one alias.
    pub fn canonical_id(&self, catalog_id: &str) -> Option<&str> {
        if let Some((id, _)) = self.catalogs.get_key_value(catalog_id) {
            return Some(id.as_str());
        }
        let target = self.aliases.get(catalog_id)?;
        self.catalogs
            .get_key_value(target.as_str())
            .map(|(id, _)| id.as_str())
    }

    pub fn resolve(&self, catalog_id: &str) -> Result<CatalogDescriptor, CatalogError> {
        let Some(id) = self.canonical_id(catalog_id) else {
            return Err(CatalogError::NotFound {
                catalog_id: catalog_id.to_string(),
            });
        };

        if let Some(hit) = self.cache.borrow().get(id) {
            return Ok(hit.clone());
        }

        let descriptor = self.build_descriptor(id)?;
        if id != catalog_id {
            tracing::debug!(alias = catalog_id, catalog = id, "resolved legacy catalog alias");
        }
        self.cache
            .borrow_mut()
            .insert(id.to_string(), descriptor.clone());
        Ok(descriptor)
    }

    fn build_descriptor(&self, id: &str) -> Result<CatalogDescriptor, CatalogError> {
        let spec = self
            .catalogs
            .get(id)
            .ok_or_else(|| CatalogError::NotFound {
                catalog_id: id.to_string(),
            })?;
        let aliases_of = self
            .aliases
            .iter()
            .filter(|(_, target)| target.as_str() == id)
            .map(|(alias, _)| alias.clone())
            .collect();
        Ok(CatalogDescriptor {
            id: spec.id.clone(),
            display_name: spec.display_name.clone(),
            endpoint: CatalogEndpoint::from_spec(spec),
            aliases_of,
        })
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Drops every cached descriptor.
    pub fn reset(&self) {
        self.cache.borrow_mut().clear();
    }
}

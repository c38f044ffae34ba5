use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// One catalog entry as written in a registry config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSpec {
    pub id: String,
    pub display_name: String,
    /// STAC API landing page, e.g. `https://earth-search.aws.element84.com/v1`.
    pub root: String,
    /// Defaults to `{root}/collections`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections_url: Option<String>,
    /// Defaults to `{root}/search`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
}

impl CatalogSpec {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        root: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            root: root.into(),
            collections_url: None,
            search_url: None,
        }
    }
}

/// Serializable registry contents: catalogs plus the legacy alias table.
///
/// Aliases map an old public identifier to a current catalog id and are
/// followed exactly once, so chains and cycles cannot occur.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub catalogs: Vec<CatalogSpec>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl RegistryConfig {
    /// The catalogs the browser ships with.
    pub fn builtin() -> Self {
        let catalogs = vec![
            CatalogSpec::new(
                "element84",
                "Earth Search by Element 84",
                "https://earth-search.aws.element84.com/v1",
            ),
            CatalogSpec::new(
                "planetary",
                "Microsoft Planetary Computer",
                "https://planetarycomputer.microsoft.com/api/stac/v1",
            ),
            CatalogSpec::new(
                "cdse",
                "Copernicus Data Space Ecosystem",
                "https://stac.dataspace.copernicus.eu/v1",
            ),
            CatalogSpec::new(
                "usgs-landsat",
                "USGS Landsat Collection 2",
                "https://landsatlook.usgs.gov/stac-server",
            ),
        ];

        let aliases = [
            ("earth-search", "element84"),
            ("earth-search-aws", "element84"),
            ("microsoft-pc", "planetary"),
            ("copernicus", "cdse"),
            ("cdse-stac", "cdse"),
        ]
        .into_iter()
        .map(|(a, t)| (a.to_string(), t.to_string()))
        .collect();

        Self { catalogs, aliases }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|e| CatalogError::Corrupt(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String, CatalogError> {
        serde_json::to_string_pretty(self).map_err(|e| CatalogError::Corrupt(e.to_string()))
    }

    /// Rejects configs whose lookups would be ambiguous or dangling.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen: BTreeMap<&str, ()> = BTreeMap::new();
        for spec in &self.catalogs {
            if spec.id.trim().is_empty() {
                return Err(CatalogError::InvalidConfig("empty catalog id".to_string()));
            }
            if spec.root.trim().is_empty() {
                return Err(CatalogError::InvalidConfig(format!(
                    "catalog `{}` has an empty root url",
                    spec.id
                )));
            }
            if seen.insert(spec.id.as_str(), ()).is_some() {
                return Err(CatalogError::DuplicateCatalog(spec.id.clone()));
            }
        }

        for (alias, target) in &self.aliases {
            if alias.trim().is_empty() {
                return Err(CatalogError::InvalidConfig("empty alias".to_string()));
            }
            if seen.contains_key(alias.as_str()) {
                return Err(CatalogError::AliasShadowsCatalog(alias.clone()));
            }
            if !seen.contains_key(target.as_str()) {
                return Err(CatalogError::DanglingAlias {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }
}

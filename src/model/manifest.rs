use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;

use crate::model::ParseError;

/// A single dependency to vendor, as declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencySpec {
    /// Logical package path. Used as the vendor destination and to derive the repository url.
    pub import_path: String,
    /// Tag, branch or commit to pin. `None` keeps whatever the fetch produced.
    pub version: Option<String>,
    /// Overrides the `https://<import_path>.git` default.
    pub repository_url: Option<String>,
    /// Proxy applied around the network operation of this dependency only.
    pub proxy: Option<String>,
}

impl DependencySpec {
    pub fn new(import_path: impl Into<String>) -> Self {
        DependencySpec {
            import_path: import_path.into(),
            version: None,
            repository_url: None,
            proxy: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = non_empty(Some(version.into()));
        self
    }

    pub fn with_repository_url(mut self, url: impl Into<String>) -> Self {
        self.repository_url = non_empty(Some(url.into()));
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = non_empty(Some(proxy.into()));
        self
    }
}

/// The decoded manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub dependencies: Vec<DependencySpec>,
}

impl Manifest {
    /// Reads a manifest. Files with a `.toml` extension are decoded as TOML, anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Manifest, ParseError> {
        debug!("Attempting to read manifest from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|error| ParseError::IO {
            path: path.display().to_string(),
            error,
        })?;

        if path.extension().is_some_and(|ext| ext == "toml") {
            Manifest::from_toml_str(&contents)
        } else {
            Manifest::from_json_str(&contents)
        }
    }

    pub fn from_json_str(data: &str) -> Result<Manifest, ParseError> {
        if data.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        let raw: RawManifest = serde_json::from_str(data)?;
        Manifest::from_raw(raw)
    }

    pub fn from_toml_str(data: &str) -> Result<Manifest, ParseError> {
        let raw: RawManifest = toml::from_str(data)?;
        Manifest::from_raw(raw)
    }

    fn from_raw(raw: RawManifest) -> Result<Manifest, ParseError> {
        let default_proxy = non_empty(raw.conf.proxy);
        let dependencies = raw
            .dependencies
            .into_iter()
            .filter_map(|entry| {
                let import_path = entry.package.unwrap_or_default();
                if import_path.is_empty() {
                    warn!("Skipping manifest entry without a package");
                    return None;
                }
                Some(DependencySpec {
                    import_path,
                    version: non_empty(entry.version),
                    repository_url: non_empty(entry.repo),
                    proxy: non_empty(entry.conf.proxy).or_else(|| default_proxy.clone()),
                })
            })
            .collect::<Vec<_>>();
        if dependencies.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(Manifest { dependencies })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    dependencies: Vec<RawDependency>,
    #[serde(default)]
    conf: RawConf,
}

#[derive(Debug, Default, Deserialize)]
struct RawDependency {
    package: Option<String>,
    version: Option<String>,
    repo: Option<String>,
    #[serde(default)]
    conf: RawConf,
}

#[derive(Debug, Default, Deserialize)]
struct RawConf {
    proxy: Option<String>,
}

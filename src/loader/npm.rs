//! npm registry access and the registry-backed loader.

use super::{LoadCache, Loader, RepositoryLoader};
use crate::error::{DetectError, Result};
use crate::http::HttpClient;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry metadata document for a package.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Packument {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub repository: Option<RepositoryField>,

    #[serde(default, rename = "dist-tags")]
    pub dist_tags: BTreeMap<String, String>,

    #[serde(default)]
    pub versions: BTreeMap<String, PackumentVersion>,
}

/// Per-version metadata inside a packument.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackumentVersion {
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default)]
    pub repository: Option<RepositoryField>,
}

/// `repository` is either a URL string or an object with a `url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RepositoryField {
    Url(String),
    Object {
        #[serde(default)]
        url: Option<String>,
    },
}

impl RepositoryField {
    fn url(&self) -> Option<&str> {
        match self {
            RepositoryField::Url(url) => Some(url),
            RepositoryField::Object { url } => url.as_deref(),
        }
    }
}

impl Packument {
    /// Repository URL of the package, falling back to the `latest` version's manifest.
    pub fn repository_url(&self) -> Option<String> {
        let latest = self
            .dist_tags
            .get("latest")
            .and_then(|version| self.versions.get(version))
            .and_then(|version| version.repository.as_ref());

        self.repository
            .as_ref()
            .and_then(RepositoryField::url)
            .or_else(|| latest.and_then(RepositoryField::url))
            .map(str::to_string)
    }
}

/// Something that can produce packuments.
pub trait PackumentSource {
    fn packument(&self, name: &str) -> Result<Packument>;
}

/// The npm registry over HTTP.
#[derive(Debug, Clone)]
pub struct Registry {
    base_url: String,
    http: HttpClient,
    cache: Arc<LoadCache>,
}

impl Registry {
    pub fn new(base_url: &str, http: HttpClient, cache: Arc<LoadCache>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            cache,
        }
    }

    fn packument_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name.replace('/', "%2F"))
    }
}

impl PackumentSource for Registry {
    fn packument(&self, name: &str) -> Result<Packument> {
        let url = self.packument_url(name);

        let bytes = self.cache.get_or_load(&url, || {
            self.http
                .get(&url)?
                .ok_or_else(|| DetectError::NotFound(format!("Package {} does not exist", name)))
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            DetectError::ParseError(format!("failed to parse registry data for {}: {}", name, e))
        })
    }
}

#[derive(Deserialize)]
struct ManifestName {
    #[serde(default)]
    name: Option<String>,
}

/// Loads a registry package from the repository its packument points at.
///
/// The repository must hold the package at its root: a `package.json` with a
/// different name is rejected.
#[derive(Debug, Clone)]
pub struct NpmLoader {
    name: String,
    inner: RepositoryLoader,
}

impl NpmLoader {
    pub fn new(name: &str, inner: RepositoryLoader) -> Self {
        Self {
            name: name.to_string(),
            inner,
        }
    }
}

impl Loader for NpmLoader {
    fn source_id(&self) -> String {
        self.inner.source_id()
    }

    fn commit(&self) -> Result<String> {
        self.inner.commit()
    }

    fn load_file(&self, path: &str) -> Result<Vec<u8>> {
        let bytes = self.inner.load_file(path)?;

        if path == "package.json" {
            let manifest: ManifestName = serde_json::from_slice(&bytes).map_err(|e| {
                DetectError::ParseError(format!("failed to parse package.json: {}", e))
            })?;

            if manifest.name.as_deref() != Some(self.name.as_str()) {
                return Err(DetectError::UserError(format!(
                    "{} does not contain {}. Monorepo not supported",
                    self.inner.url(),
                    self.name
                )));
            }
        }

        Ok(bytes)
    }

    fn load_folder(&self, path: &str) -> Result<Vec<String>> {
        self.inner.load_folder(path)
    }
}

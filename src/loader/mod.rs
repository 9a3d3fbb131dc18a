//! Access to package sources: local work trees, GitHub repositories and the npm registry.
//!
//! Every source is exposed through the [`Loader`] trait. A missing file is
//! reported as [`DetectError::NotFound`] so callers can treat it as absence;
//! every other failure propagates unchanged.

mod cache;
mod npm;
mod path;
mod repository;
mod target;


use crate::error::{DetectError, Result};
use crate::http::HttpClient;
use crate::tree::{parse_mapping, Mapping};
use serde::de::DeserializeOwned;

pub use cache::LoadCache;
pub use npm::{NpmLoader, Packument, PackumentSource, PackumentVersion, Registry, RepositoryField};
pub use path::PathLoader;
pub use repository::{GithubRepository, RepositoryLoader};
pub use target::Target;

/// A source of package files.
pub trait Loader {
    /// Stable identifier of the source (e.g. `github:owner/repo`).
    fn source_id(&self) -> String;

    /// Commit id of the source's `HEAD`.
    fn commit(&self) -> Result<String>;

    /// Raw contents of `path`, relative to the source root.
    fn load_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Entry names of the folder at `path`. Empty when the folder does not exist.
    fn load_folder(&self, path: &str) -> Result<Vec<String>>;

    /// Cache key for `path` within this source.
    fn resource_id(&self, path: &str) -> String {
        format!("{}#{}", self.source_id(), path)
    }
}

/// Opens loaders for targets.
pub trait LoaderFactory {
    fn open(&self, target: &Target) -> Result<Box<dyn Loader>>;
}

/// Load `path` and decode it as JSON.
pub fn load_json<T: DeserializeOwned>(loader: &dyn Loader, path: &str) -> Result<T> {
    let bytes = loader.load_file(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| DetectError::ParseError(format!("failed to parse {}: {}", path, e)))
}

/// Load `path` and parse it as a YAML mapping.
pub fn load_yaml(loader: &dyn Loader, path: &str) -> Result<Mapping> {
    let bytes = loader.load_file(path)?;
    parse_mapping(&bytes, path)
}

/// Turn a not-found error into `None`, keeping every other outcome.
pub fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Endpoints used by [`DefaultLoaders`].
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub github_raw_url: String,
    pub github_api_url: String,
}

/// Opens path, repository and registry loaders over HTTP.
#[derive(Debug, Clone)]
pub struct DefaultLoaders {
    http: HttpClient,
    endpoints: Endpoints,
    registry: Registry,
}

impl DefaultLoaders {
    pub fn new(http: HttpClient, endpoints: Endpoints, registry: Registry) -> Self {
        Self {
            http,
            endpoints,
            registry,
        }
    }

    fn repository(&self, url: &str) -> Result<RepositoryLoader> {
        RepositoryLoader::new(url, self.http.clone(), &self.endpoints)
    }
}

impl LoaderFactory for DefaultLoaders {
    fn open(&self, target: &Target) -> Result<Box<dyn Loader>> {
        match target {
            Target::Path(path) => Ok(Box::new(PathLoader::open(path)?)),
            Target::Repository(url) => Ok(Box::new(self.repository(url)?)),
            Target::PackageName(name) => {
                let packument = self.registry.packument(name)?;
                let url = packument.repository_url().ok_or_else(|| {
                    DetectError::UserError(format!(
                        "Unable to determine the git repository for {}",
                        name
                    ))
                })?;
                Ok(Box::new(NpmLoader::new(name, self.repository(&url)?)))
            }
        }
    }
}

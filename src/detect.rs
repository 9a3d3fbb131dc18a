//! Detection of a package's Node.js support.
//!
//! A [`Detector`] owns no I/O of its own: packages are opened through a
//! [`LoaderFactory`], tokens are resolved by a [`VersionResolver`] and the
//! dependency tree comes from a [`DependencyResolver`]. Dependencies are
//! detected one at a time in name order; a failing dependency is recorded
//! under `errors` and does not stop the others.

use crate::deps::{DependencyOptions, DependencyResolver};
use crate::error::Result;
use crate::loader::{LoadCache, Loader, LoaderFactory, Target};
use crate::package::PackageJson;
use crate::report::{DependencyReport, ErrorEntry, PackageReport};
use crate::resolver::VersionResolver;
use crate::{engines, github_actions, travis};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// What to include in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectOptions {
    /// Detect the support of every dependency as well.
    pub deps: bool,
    /// With `deps`, include dev dependencies.
    pub dev: bool,
    /// With `deps`, include transitive dependencies.
    pub deep: bool,
    /// Scan GitHub Actions workflows.
    pub github_actions: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            deps: false,
            dev: false,
            deep: false,
            github_actions: true,
        }
    }
}

pub struct Detector<'a> {
    loaders: &'a dyn LoaderFactory,
    resolver: &'a dyn VersionResolver,
    dependencies: &'a dyn DependencyResolver,
    cache: &'a LoadCache,
    setup_node_actions: Vec<String>,
}

impl<'a> Detector<'a> {
    pub fn new(
        loaders: &'a dyn LoaderFactory,
        resolver: &'a dyn VersionResolver,
        dependencies: &'a dyn DependencyResolver,
        cache: &'a LoadCache,
    ) -> Self {
        Self {
            loaders,
            resolver,
            dependencies,
            cache,
            setup_node_actions: vec!["actions/setup-node".to_string()],
        }
    }

    /// Prefixes of `uses` values treated as node setup steps.
    pub fn with_setup_node_actions(mut self, actions: Vec<String>) -> Self {
        self.setup_node_actions = actions;
        self
    }

    /// Detect support for `what`: a path, a repository URL, `owner/repo` or a package name.
    pub fn detect(&self, what: &str, options: &DetectOptions) -> Result<PackageReport> {
        self.detect_target(&Target::from_what(what), options)
    }

    pub fn detect_target(&self, target: &Target, options: &DetectOptions) -> Result<PackageReport> {
        debug!(?target, "Detecting");
        let loader = self.loaders.open(target)?;
        let loader = loader.as_ref();

        let manifest = PackageJson::load(loader)?;
        let commit = loader.commit()?;

        let travis = travis::detect(loader, self.loaders, self.cache, self.resolver)?;
        let engines = engines::detect(&manifest);

        let github_actions = if options.github_actions {
            github_actions::detect(loader, self.resolver, &self.setup_node_actions)?
        } else {
            None
        };

        let dependencies = if options.deps {
            Some(self.detect_dependencies(loader, options)?)
        } else {
            None
        };

        Ok(PackageReport {
            name: manifest.name,
            version: manifest.version,
            commit,
            timestamp: Utc::now().timestamp_millis(),
            travis,
            engines,
            github_actions,
            dependencies,
        })
    }

    fn detect_dependencies(&self, loader: &dyn Loader, options: &DetectOptions) -> Result<DependencyReport> {
        let versions = self.dependencies.resolve(
            loader,
            &DependencyOptions {
                dev: options.dev,
                deep: options.deep,
            },
        )?;

        let nested = DetectOptions {
            deps: false,
            ..*options
        };

        let mut support = Vec::new();
        let mut errors = BTreeMap::new();
        let total = versions.len();

        for (i, name) in versions.keys().enumerate() {
            info!("Resolving dependency {} of {}: {}", i + 1, total, name);

            match self.detect_target(&Target::PackageName(name.clone()), &nested) {
                Ok(report) => support.push(report),
                Err(err) => {
                    warn!(dependency = %name, error = %err, "Dependency detection failed");
                    errors.insert(
                        name.clone(),
                        ErrorEntry {
                            message: err.to_string(),
                        },
                    );
                }
            }
        }

        Ok(DependencyReport {
            versions,
            support,
            errors,
        })
    }
}

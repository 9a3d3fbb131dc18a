use crate::deps::{DependencyOptions, DependencyResolver};
use crate::error::{DetectError, Result};
use crate::loader::{GithubRepository, Loader, LoaderFactory, Packument, PackumentSource, Target};
use crate::resolver::VersionResolver;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

pub(crate) const DEFAULT_PACKAGE_JSON: &str =
    r#"{"name":"test-module","version":"0.0.0-development"}"#;

/// A committed git work tree holding `files` (relative path, contents).
pub(crate) fn create_git_repo(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    git(path, &["init"]);
    // Deterministic default branch name across environments.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);

    std::fs::write(path.join("README.md"), "# Test\n").unwrap();
    for (name, contents) in files {
        let file = path.join(name);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(file, contents).unwrap();
    }

    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);

    temp_dir
}

/// Like [`create_git_repo`], adding a default `package.json` unless `files` has one.
pub(crate) fn create_package_repo(files: &[(&str, &str)]) -> TempDir {
    let mut all: Vec<(&str, &str)> = files.to_vec();
    if !files.iter().any(|(name, _)| *name == "package.json") {
        all.push(("package.json", DEFAULT_PACKAGE_JSON));
    }
    create_git_repo(&all)
}

fn git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }
}

// ============================================================================
// In-memory doubles
// ============================================================================

pub(crate) const TEST_COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

/// A loader over in-memory files. Clones share the load log.
#[derive(Debug, Clone)]
pub(crate) struct MemoryLoader {
    id: String,
    files: Rc<BTreeMap<String, Vec<u8>>>,
    log: Rc<RefCell<Vec<String>>>,
}

impl MemoryLoader {
    pub(crate) fn new(id: &str, files: &[(&str, &str)]) -> Self {
        let files = files
            .iter()
            .map(|(name, contents)| (name.to_string(), contents.as_bytes().to_vec()))
            .collect();

        Self {
            id: id.to_string(),
            files: Rc::new(files),
            log: Rc::default(),
        }
    }

    /// A loader whose `package.json` is [`DEFAULT_PACKAGE_JSON`] unless `files` has one.
    pub(crate) fn package(id: &str, files: &[(&str, &str)]) -> Self {
        let mut all: Vec<(&str, &str)> = files.to_vec();
        if !files.iter().any(|(name, _)| *name == "package.json") {
            all.push(("package.json", DEFAULT_PACKAGE_JSON));
        }
        Self::new(id, &all)
    }

    /// Paths passed to `load_file`, in call order.
    pub(crate) fn loaded(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl Loader for MemoryLoader {
    fn source_id(&self) -> String {
        format!("memory:{}", self.id)
    }

    fn commit(&self) -> Result<String> {
        Ok(TEST_COMMIT.to_string())
    }

    fn load_file(&self, path: &str) -> Result<Vec<u8>> {
        self.log.borrow_mut().push(path.to_string());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| DetectError::NotFound(format!("{} does not contain a {}", self.id, path)))
    }

    fn load_folder(&self, path: &str) -> Result<Vec<String>> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut names: Vec<String> = self
            .files
            .keys()
            .filter_map(|file| file.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .map(str::to_string)
            .collect();
        names.dedup();
        Ok(names)
    }
}

/// Opens [`MemoryLoader`]s registered by repository, package name or path.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryLoaders {
    repositories: HashMap<String, MemoryLoader>,
    packages: HashMap<String, MemoryLoader>,
    paths: HashMap<PathBuf, MemoryLoader>,
}

impl MemoryLoaders {
    /// Register `loader` for the github.com repository `owner/name`.
    pub(crate) fn with_repository(mut self, full_name: &str, loader: MemoryLoader) -> Self {
        self.repositories.insert(full_name.to_string(), loader);
        self
    }

    pub(crate) fn with_package(mut self, name: &str, loader: MemoryLoader) -> Self {
        self.packages.insert(name.to_string(), loader);
        self
    }

    pub(crate) fn with_path(mut self, path: &str, loader: MemoryLoader) -> Self {
        self.paths.insert(PathBuf::from(path), loader);
        self
    }
}

impl LoaderFactory for MemoryLoaders {
    fn open(&self, target: &Target) -> Result<Box<dyn Loader>> {
        let loader = match target {
            Target::Repository(url) => {
                let repository = GithubRepository::parse(url)?;
                self.repositories.get(&repository.full_name()).ok_or_else(|| {
                    DetectError::LoaderError(format!("{} is not reachable", url))
                })?
            }
            Target::PackageName(name) => self.packages.get(name).ok_or_else(|| {
                DetectError::NotFound(format!("Package {} does not exist", name))
            })?,
            Target::Path(path) => self.paths.get(path).ok_or_else(|| {
                DetectError::UserError(format!("{} is not a git repository", path.display()))
            })?,
        };

        Ok(Box::new(loader.clone()))
    }
}

/// Resolves tokens from a fixed table; everything else is unresolvable.
#[derive(Debug, Clone, Default)]
pub(crate) struct StaticResolver {
    versions: HashMap<String, String>,
}

impl StaticResolver {
    pub(crate) fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            versions: entries
                .iter()
                .map(|(token, version)| (token.to_string(), version.to_string()))
                .collect(),
        }
    }
}

impl VersionResolver for StaticResolver {
    fn resolve(&self, token: &str) -> Result<Option<String>> {
        Ok(self.versions.get(token).cloned())
    }
}

/// Returns the same dependency versions for every package.
#[derive(Debug, Clone, Default)]
pub(crate) struct StaticDependencies {
    versions: BTreeMap<String, Vec<String>>,
}

impl StaticDependencies {
    /// `entries` are (name, version) pairs; a name may repeat.
    pub(crate) fn new(entries: &[(&str, &str)]) -> Self {
        let mut versions: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, version) in entries {
            versions
                .entry(name.to_string())
                .or_default()
                .push(version.to_string());
        }
        Self { versions }
    }
}

impl DependencyResolver for StaticDependencies {
    fn resolve(
        &self,
        _loader: &dyn Loader,
        _options: &DependencyOptions,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        Ok(self.versions.clone())
    }
}

/// Packuments from memory.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryRegistry {
    packuments: HashMap<String, Packument>,
}

impl MemoryRegistry {
    /// Register a packument given as JSON.
    pub(crate) fn with(mut self, name: &str, json: serde_json::Value) -> Self {
        let packument: Packument = serde_json::from_value(json).unwrap();
        self.packuments.insert(name.to_string(), packument);
        self
    }
}

impl PackumentSource for MemoryRegistry {
    fn packument(&self, name: &str) -> Result<Packument> {
        self.packuments
            .get(name)
            .cloned()
            .ok_or_else(|| DetectError::NotFound(format!("Package {} does not exist", name)))
    }
}

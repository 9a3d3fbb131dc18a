//! Loader for a local git work tree.

use super::Loader;
use crate::error::{DetectError, Result};
use crate::git;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads files straight from a local work tree.
#[derive(Debug, Clone)]
pub struct PathLoader {
    root: PathBuf,
}

impl PathLoader {
    /// Open the work tree at `path`.
    ///
    /// Fails if `path` is not inside a git repository or has no `package.json`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();

        if !git::is_repository(&root) {
            return Err(DetectError::UserError(format!(
                "{} is not a git repository",
                root.display()
            )));
        }

        if !root.join("package.json").is_file() {
            return Err(DetectError::UserError(format!(
                "{} does not contain a package.json",
                root.display()
            )));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Loader for PathLoader {
    fn source_id(&self) -> String {
        format!("path:{}", self.root.display())
    }

    fn commit(&self) -> Result<String> {
        git::head_commit(&self.root)
    }

    fn load_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.root.join(path);

        std::fs::read(&full_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DetectError::NotFound(format!(
                "{} does not contain a {}",
                self.root.display(),
                path
            )),
            _ => DetectError::LoaderError(format!(
                "failed to read '{}': {}",
                full_path.display(),
                e
            )),
        })
    }

    fn load_folder(&self, path: &str) -> Result<Vec<String>> {
        let full_path = self.root.join(path);

        let entries = match std::fs::read_dir(&full_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DetectError::LoaderError(format!(
                    "failed to list '{}': {}",
                    full_path.display(),
                    e
                )));
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                DetectError::LoaderError(format!("failed to list '{}': {}", full_path.display(), e))
            })?;
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();

        Ok(names)
    }
}

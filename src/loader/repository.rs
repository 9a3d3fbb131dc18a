//! Loader for a github.com repository.
//!
//! Files are fetched from the raw content host at `HEAD`, folder listings from
//! the contents API, and the commit id with `git ls-remote`.

use super::{Endpoints, Loader};
use crate::error::{DetectError, Result};
use crate::git;
use crate::http::HttpClient;
use serde::Deserialize;

/// An `owner/name` repository on github.com.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepository {
    pub owner: String,
    pub name: String,
}

impl GithubRepository {
    /// Parse the repository URL forms found in `package.json` files and on the command line.
    ///
    /// Accepts `https://github.com/o/r`, `git+https://…`, `git://…`, `git+ssh://git@…`,
    /// `git@github.com:o/r.git`, `github:o/r` and bare `o/r`.
    pub fn parse(url: &str) -> Result<Self> {
        let unsupported =
            || DetectError::UserError(format!("Only github.com paths supported: {}", url));

        let trimmed = url.trim();
        let path = if let Some(rest) = trimmed.strip_prefix("github:") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("git@github.com:") {
            rest
        } else if let Some((_, rest)) = trimmed.split_once("://") {
            let rest = rest.rsplit_once('@').map(|(_, host)| host).unwrap_or(rest);
            let (host, path) = rest.split_once(['/', ':']).ok_or_else(unsupported)?;
            if host != "github.com" && host != "www.github.com" {
                return Err(unsupported());
            }
            path
        } else if trimmed.split('/').count() == 2 && !trimmed.contains(':') {
            trimmed
        } else {
            return Err(unsupported());
        };

        let path = path.split(['#', '?']).next().unwrap_or(path);
        let mut segments = path.trim_matches('/').split('/');
        let owner = segments.next().unwrap_or_default();
        let name = segments.next().unwrap_or_default();
        let name = name.strip_suffix(".git").unwrap_or(name);

        if owner.is_empty() || name.is_empty() {
            return Err(unsupported());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn https_url(&self) -> String {
        format!("https://github.com/{}", self.full_name())
    }
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
}

/// Reads files from a github.com repository over HTTP.
#[derive(Debug, Clone)]
pub struct RepositoryLoader {
    url: String,
    repository: GithubRepository,
    http: HttpClient,
    endpoints: Endpoints,
}

impl RepositoryLoader {
    pub fn new(url: &str, http: HttpClient, endpoints: &Endpoints) -> Result<Self> {
        Ok(Self {
            url: url.to_string(),
            repository: GithubRepository::parse(url)?,
            http,
            endpoints: endpoints.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Loader for RepositoryLoader {
    fn source_id(&self) -> String {
        format!("github:{}", self.repository.full_name())
    }

    fn commit(&self) -> Result<String> {
        git::remote_head_commit(&self.repository.https_url())
    }

    fn load_file(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}/{}/HEAD/{}",
            self.endpoints.github_raw_url.trim_end_matches('/'),
            self.repository.full_name(),
            path
        );

        self.http.get(&url)?.ok_or_else(|| {
            DetectError::NotFound(format!("{} does not contain a {}", self.url, path))
        })
    }

    fn load_folder(&self, path: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.endpoints.github_api_url.trim_end_matches('/'),
            self.repository.full_name(),
            path
        );

        let Some(body) = self.http.get_authorized(&url)? else {
            return Ok(Vec::new());
        };

        folder_names(&body, &url)
    }
}

/// Entry names of a contents API response. A file path answers with a single
/// object rather than a listing and yields no names.
pub(super) fn folder_names(body: &[u8], url: &str) -> Result<Vec<String>> {
    let parse_error =
        |e: serde_json::Error| DetectError::ParseError(format!("failed to parse folder listing {}: {}", url, e));

    let response: serde_json::Value = serde_json::from_slice(body).map_err(parse_error)?;
    if !response.is_array() {
        return Ok(Vec::new());
    }
    let entries: Vec<ContentEntry> = serde_json::from_value(response).map_err(parse_error)?;

    let mut names: Vec<String> = entries.into_iter().map(|entry| entry.name).collect();
    names.sort();
    Ok(names)
}

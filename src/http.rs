//! Blocking HTTP access for loaders and the release index.
//!
//! A thin wrapper over `reqwest::blocking::Client` that treats `404` as absence
//! and every other non-success status as a loader error.

use crate::error::{DetectError, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Shared HTTP client. Cloning is cheap; clones share a connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    token: Option<String>,
}

impl HttpClient {
    /// Build a client with the given user agent and request timeout.
    ///
    /// `token` is sent as a bearer token on [`HttpClient::get_authorized`] requests only.
    pub fn new(user_agent: &str, timeout: Duration, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| DetectError::LoaderError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, token })
    }

    /// GET `url`. Returns `Ok(None)` on `404 Not Found`.
    pub fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        self.send(url, false)
    }

    /// GET `url` with the configured token, if any.
    pub fn get_authorized(&self, url: &str) -> Result<Option<Vec<u8>>> {
        self.send(url, true)
    }

    /// GET `url` and decode the body as JSON. Returns `Ok(None)` on `404 Not Found`.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let Some(body) = self.get(url)? else {
            return Ok(None);
        };

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| DetectError::ParseError(format!("failed to parse JSON from {}: {}", url, e)))
    }

    fn send(&self, url: &str, authorized: bool) -> Result<Option<Vec<u8>>> {
        debug!(%url, "Loading");

        let mut request = self.client.get(url);
        if authorized {
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
        }

        let response = request
            .send()
            .map_err(|e| DetectError::LoaderError(format!("failed to load {}: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%url, "Not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DetectError::LoaderError(format!(
                "failed to load {}: HTTP {}",
                url, status
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| DetectError::LoaderError(format!("failed to read {}: {}", url, e)))?;

        debug!(%url, "Loaded");
        Ok(Some(bytes.to_vec()))
    }
}

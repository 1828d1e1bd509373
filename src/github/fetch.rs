//! Read-through cached HTTP GET for JSON resources.
//!
//! [`CachedFetcher`] consults an optional on-disk [`ResponseCache`] keyed by
//! request URL before going to its [`Transport`]. Successful bodies are
//! stored verbatim; failures are never cached.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Timeout applied to each HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("changelog-kit/", env!("CARGO_PKG_VERSION"));

/// Request headers as `(name, value)` pairs.
pub type Headers = [(&'static str, String)];

/// HTTP GET returning the response body.
pub trait Transport: Send + Sync {
    /// Fetches `url`, failing on transport errors and non-2xx statuses.
    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: &'a Headers,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// [`Transport`] backed by `reqwest`.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the default timeout and user agent.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: &'a Headers,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let mut request = self.client.get(url);
            for (name, value) in headers {
                request = request.header(*name, value.as_str());
            }

            info!(url = %url, "Sending request to hosting API");
            let response = request
                .send()
                .await
                .with_context(|| format!("Request to {url} failed"))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_else(|e| {
                    debug!("Failed to read error response body: {e}");
                    String::new()
                });
                anyhow::bail!("GET {url} failed: HTTP {status}: {error_text}");
            }

            response
                .text()
                .await
                .with_context(|| format!("Failed to read response body from {url}"))
        })
    }
}

/// Response bodies stored one file per URL.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Uses `dir` as cache storage; it is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the entry for `url`.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        let key = hex::encode(Sha256::digest(url.as_bytes()));
        self.dir.join(format!("{key}.json"))
    }

    /// Returns the stored body for `url`, if any.
    pub async fn get(&self, url: &str) -> Result<Option<String>> {
        let path = self.entry_path(url);
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read cache entry: {}", path.display())),
        }
    }

    /// Stores `body` for `url`, replacing any previous entry atomically.
    pub async fn put(&self, url: &str, body: &str) -> Result<()> {
        let dir = self.dir.clone();
        let path = self.entry_path(url);
        let body = body.to_owned();

        tokio::task::spawn_blocking(move || write_entry(&dir, &path, &body))
            .await
            .context("Cache writer task panicked")?
    }
}

fn write_entry(dir: &Path, path: &Path, body: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

    // Same directory as the target so the rename stays on one filesystem
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(body.as_bytes())
        .context("Failed to write cache entry")?;
    file.persist(path)
        .with_context(|| format!("Failed to store cache entry: {}", path.display()))?;

    debug!(path = %path.display(), bytes = body.len(), "Stored cache entry");
    Ok(())
}

/// JSON fetcher with an optional read-through cache.
pub struct CachedFetcher {
    transport: Box<dyn Transport>,
    cache: Option<ResponseCache>,
}

impl CachedFetcher {
    /// Creates a fetcher; `None` disables caching.
    pub fn new(transport: Box<dyn Transport>, cache: Option<ResponseCache>) -> Self {
        Self { transport, cache }
    }

    /// The cache in use, if any.
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// Fetches `url` and parses the body as JSON, serving from cache when possible.
    ///
    /// Concurrent misses for one URL each reach the transport; the last
    /// writer's body is the one that stays cached.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, headers: &Headers) -> Result<T> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(url).await? {
                match serde_json::from_str(&body) {
                    Ok(value) => {
                        debug!(url = %url, "Cache hit");
                        return Ok(value);
                    }
                    Err(e) => debug!(url = %url, error = %e, "Ignoring unreadable cache entry"),
                }
            } else {
                debug!(url = %url, "Cache miss");
            }
        }

        let body = self.transport.get(url, headers).await?;
        let value = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse response from {url}"))?;

        if let Some(cache) = &self.cache {
            cache.put(url, &body).await?;
        }

        Ok(value)
    }
}

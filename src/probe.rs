//! Existence checks against the static resource host

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Answer to a single existence check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Found,
    Missing,
    /// The check itself failed (transport or I/O error)
    Failed(String),
}

#[async_trait]
pub trait ExistenceProbe: Send + Sync {
    /// Check whether a host-relative path such as `/gallery/l1.jpg` exists
    async fn probe(&self, path: &str) -> ProbeOutcome;
}

/// HEAD requests against an HTTP host
pub struct HttpProbe {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProbe {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[async_trait]
impl ExistenceProbe for HttpProbe {
    async fn probe(&self, path: &str) -> ProbeOutcome {
        let url = self.url_for(path);
        match self
            .client
            .head(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => ProbeOutcome::Found,
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "Probe miss");
                ProbeOutcome::Missing
            }
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }
}

/// Local directory standing in for the host
pub struct DirProbe {
    root: PathBuf,
}

impl DirProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn file_for(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ExistenceProbe for DirProbe {
    async fn probe(&self, path: &str) -> ProbeOutcome {
        match tokio::fs::metadata(self.file_for(path)).await {
            Ok(meta) if meta.is_file() => ProbeOutcome::Found,
            Ok(_) => ProbeOutcome::Missing,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProbeOutcome::Missing,
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }
}

/// Whether a configured host should be reached over HTTP
pub fn is_http_host(host: &str) -> bool {
    host.starts_with("http://") || host.starts_with("https://")
}

/// Join a base URL and a host-relative path with exactly one slash
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Build the probe matching the configured host
pub fn probe_for_host(host: &str, timeout: Duration) -> Result<Box<dyn ExistenceProbe>> {
    if is_http_host(host) {
        Ok(Box::new(HttpProbe::new(host, timeout)?))
    } else {
        Ok(Box::new(DirProbe::new(host)))
    }
}

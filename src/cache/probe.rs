//! Existence probes against remote repositories.
//!
//! The generator never downloads artifacts; it only asks each configured
//! repository whether it serves a given path, so the generated `http_file`
//! rules can list every URL the artifact is available from.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::trace;

use crate::config::Credentials;

/// Answers "does this URL exist?".
pub trait RepositoryProbe {
    /// Whether `url` resolves to an existing resource.
    ///
    /// An `Err` is treated by callers the same as `Ok(false)`.
    fn exists(&self, url: &str, credentials: Option<&Credentials>) -> Result<bool>;
}

/// Probe issuing HTTP `HEAD` requests, and checking the file system for
/// `file://` repositories.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// A probe without request timeout.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!("bazel-depgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
        })
    }
}

impl RepositoryProbe for HttpProbe {
    fn exists(&self, url: &str, credentials: Option<&Credentials>) -> Result<bool> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(Path::new(path).is_file());
        }

        let mut request = self.client.head(url);
        if let Some(credentials) = credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }
        let response = request.send().with_context(|| format!("HEAD {url} failed"))?;
        trace!("HEAD {url} -> {}", response.status());
        Ok(response.status().is_success())
    }
}

//! HTTP client for basket probing and card downloads
//!
//! Thin wrapper around `reqwest` that fixes the user agent, timeout and
//! redirect policy. Status codes are returned to the caller untouched: the
//! probe adapter and the harvester each classify them their own way.

use std::time::Duration;
use reqwest::{Client, Response, StatusCode, header::{HeaderMap, HeaderValue, USER_AGENT}};
use anyhow::{Result, Context};

use crate::infrastructure::config::{HarvestConfig, ProbeConfig};

/// HTTP client configuration
#[derive(Debug, Clone, serde::Serialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    /// Short-timeout client for existence probes
    pub fn for_probes(probe: &ProbeConfig) -> Self {
        Self {
            user_agent: probe.user_agent.clone(),
            timeout_seconds: probe.timeout_seconds,
            follow_redirects: true,
        }
    }

    /// Client for card downloads, sharing the probe user agent
    pub fn for_harvest(harvest: &HarvestConfig, user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            timeout_seconds: harvest.timeout_seconds,
            follow_redirects: true,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::for_probes(&ProbeConfig::default())
    }
}

/// Cheap to clone; clones share the connection pool
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        // Setup headers
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .context("Invalid user agent")?
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Header-only request; returns the status without reading a body
    pub async fn head(&self, url: &str) -> reqwest::Result<StatusCode> {
        tracing::trace!("HEAD {}", url);
        let response = self.client.head(url).send().await?;
        Ok(response.status())
    }

    /// GET request; any status is returned as a response
    pub async fn get(&self, url: &str) -> reqwest::Result<Response> {
        tracing::debug!("GET {}", url);
        self.client.get(url).send().await
    }

    /// Get the configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

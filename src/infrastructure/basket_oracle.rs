//! HTTP existence oracle
//!
//! Answers "does basket B serve the volume at index i?" with a `HEAD`
//! request for a known asset of the volume's representative article. Only an
//! explicit HTTP 200 counts as a match. Everything else (404, other statuses,
//! timeouts, connection errors) is a miss, so an inconclusive probe can never
//! be mistaken for a basket.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::domain::{BasketLabel, ExistenceOracle, VolumeCatalog, WaitStrategy};
use crate::infrastructure::config::ProbeConfig;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::retry_policy::RetryPolicy;

/// Classified answer of one probe request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The asset exists on this basket
    Present,
    /// Definitive miss
    Absent,
    /// Timeout, transport failure, throttling or server error
    Transient,
}

impl ProbeOutcome {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Self::Present,
            StatusCode::TOO_MANY_REQUESTS => Self::Transient,
            status if status.is_server_error() => Self::Transient,
            _ => Self::Absent,
        }
    }
}

pub struct HttpBasketOracle<W: WaitStrategy> {
    catalog: Arc<VolumeCatalog>,
    client: HttpClient,
    pacing: W,
    retry: RetryPolicy,
    host_pattern: String,
    probe_asset: String,
}

impl<W: WaitStrategy> HttpBasketOracle<W> {
    pub fn new(catalog: Arc<VolumeCatalog>, client: HttpClient, pacing: W, probe: &ProbeConfig) -> Self {
        Self {
            catalog,
            client,
            pacing,
            retry: probe.retry.clone(),
            host_pattern: probe.host_pattern.clone(),
            probe_asset: probe.probe_asset.clone(),
        }
    }

    /// Probe URL for the volume at `volume_index`, if the index is in range
    pub fn probe_url(&self, volume_index: usize, basket: BasketLabel) -> Option<String> {
        let article = self.catalog.representative_at(volume_index)?;
        Some(article.asset_url(&basket.host(&self.host_pattern), &self.probe_asset))
    }

    async fn request(&self, url: &str) -> ProbeOutcome {
        self.pacing.wait().await;
        match self.client.head(url).await {
            Ok(status) => {
                trace!("{} -> {}", url, status);
                ProbeOutcome::from_status(status)
            }
            Err(e) => {
                debug!("Probe transport failure for {}: {}", url, e);
                ProbeOutcome::Transient
            }
        }
    }
}

#[async_trait]
impl<W: WaitStrategy> ExistenceOracle for HttpBasketOracle<W> {
    async fn probe(&self, volume_index: usize, basket: BasketLabel) -> bool {
        let Some(url) = self.probe_url(volume_index, basket) else {
            return false;
        };

        let mut retries = 0;
        loop {
            match self.request(&url).await {
                ProbeOutcome::Present => return true,
                ProbeOutcome::Absent => return false,
                ProbeOutcome::Transient if self.retry.should_retry(retries) => {
                    retries += 1;
                    let delay = self.retry.delay_for(retries);
                    debug!("🔄 Retrying probe {} in {:?} (retry {})", url, delay, retries);
                    tokio::time::sleep(delay).await;
                }
                ProbeOutcome::Transient => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Article;
    use crate::infrastructure::http_client::HttpClientConfig;
    use crate::infrastructure::pacing::NoDelay;

    #[test]
    fn test_status_classification() {
        assert_eq!(ProbeOutcome::from_status(StatusCode::OK), ProbeOutcome::Present);
        assert_eq!(ProbeOutcome::from_status(StatusCode::NOT_FOUND), ProbeOutcome::Absent);
        assert_eq!(ProbeOutcome::from_status(StatusCode::NO_CONTENT), ProbeOutcome::Absent);
        assert_eq!(ProbeOutcome::from_status(StatusCode::FORBIDDEN), ProbeOutcome::Absent);
        assert_eq!(
            ProbeOutcome::from_status(StatusCode::TOO_MANY_REQUESTS),
            ProbeOutcome::Transient
        );
        assert_eq!(
            ProbeOutcome::from_status(StatusCode::BAD_GATEWAY),
            ProbeOutcome::Transient
        );
    }

    #[test]
    fn test_probe_url_uses_representative_article() {
        let catalog = Arc::new(VolumeCatalog::from_articles([Article::new(1_234_567)]));
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let oracle = HttpBasketOracle::new(catalog, client, NoDelay, &ProbeConfig::default());
        let basket = BasketLabel::new(3).unwrap();

        assert_eq!(
            oracle.probe_url(0, basket).as_deref(),
            Some("https://basket-03.wbbasket.ru/vol12/part1234/1234567/images/big/1.webp")
        );
        assert_eq!(oracle.probe_url(1, basket), None);
    }
}

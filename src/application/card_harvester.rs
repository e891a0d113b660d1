//! Card harvester
//!
//! Downloads the product card document of each article from the basket that
//! serves it and appends it to the record store. Baskets are resolved
//! through the bands produced by the basket mapper, so no probing happens
//! here. Articles already in the store are skipped, which makes an
//! interrupted harvest resumable.
//!
//! Timeouts and connection failures are retried per `harvest.retry`; HTTP
//! 429 has its own budget.

use anyhow::Result;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::domain::{Article, BasketBands, ResultSink};
use crate::infrastructure::config::HarvestConfig;
use crate::infrastructure::harvest_error::HarvestError;
use crate::infrastructure::http_client::HttpClient;

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestSummary {
    /// Distinct articles asked for
    pub requested: usize,
    pub skipped_existing: usize,
    pub stored: usize,
    pub not_found: usize,
    /// No band covers the article's volume
    pub unresolved: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardOutcome {
    Stored,
    NotFound,
    Unresolved,
    Failed,
}

pub struct CardHarvester<S: ResultSink> {
    client: HttpClient,
    bands: BasketBands,
    sink: Arc<S>,
    config: HarvestConfig,
    host_pattern: String,
}

impl<S: ResultSink> CardHarvester<S> {
    pub fn new(
        client: HttpClient,
        bands: BasketBands,
        sink: Arc<S>,
        config: HarvestConfig,
        host_pattern: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bands,
            sink,
            config,
            host_pattern: host_pattern.into(),
        }
    }

    /// Card URL for `article`, if a band covers it
    pub fn card_url(&self, article: Article) -> Option<String> {
        let basket = self.bands.basket_for(article)?;
        Some(article.asset_url(&basket.host(&self.host_pattern), &self.config.card_asset))
    }

    /// Harvest every article not yet in the store
    ///
    /// Only a failure to read the store aborts the run; per-article problems
    /// are logged and counted.
    pub async fn harvest(&self, articles: &[Article]) -> Result<HarvestSummary> {
        let unique: BTreeSet<Article> = articles.iter().copied().collect();
        let existing = self.sink.existing_articles().await?;
        let pending: Vec<Article> = unique
            .iter()
            .copied()
            .filter(|article| !existing.contains(article))
            .collect();

        let mut summary = HarvestSummary {
            requested: unique.len(),
            skipped_existing: unique.len() - pending.len(),
            ..HarvestSummary::default()
        };
        info!(
            "🚀 Harvesting {} cards ({} already stored, concurrency {})",
            pending.len(),
            summary.skipped_existing,
            self.config.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let tasks = pending.iter().map(|&article| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return CardOutcome::Failed;
                };
                self.harvest_one(article).await
            }
        });

        for outcome in futures::future::join_all(tasks).await {
            match outcome {
                CardOutcome::Stored => summary.stored += 1,
                CardOutcome::NotFound => summary.not_found += 1,
                CardOutcome::Unresolved => summary.unresolved += 1,
                CardOutcome::Failed => summary.failed += 1,
            }
        }

        info!(
            "🎉 Harvest finished: {} stored, {} not found, {} unresolved, {} failed",
            summary.stored, summary.not_found, summary.unresolved, summary.failed
        );
        Ok(summary)
    }

    async fn harvest_one(&self, article: Article) -> CardOutcome {
        match self.fetch_card(article).await {
            Ok(Some(record)) => match self.sink.append_record(&record).await {
                Ok(()) => CardOutcome::Stored,
                Err(e) => {
                    error!("❌ Failed to store card {}: {:#}", article, e);
                    CardOutcome::Failed
                }
            },
            Ok(None) => CardOutcome::NotFound,
            Err(HarvestError::NoBasketForArticle { .. }) => {
                warn!("⚠️ Basket not found for article {}", article);
                CardOutcome::Unresolved
            }
            Err(e) => {
                warn!(
                    "⚠️ Card {} failed ({}): {}",
                    article,
                    if e.is_recoverable() { "recoverable" } else { "permanent" },
                    e
                );
                CardOutcome::Failed
            }
        }
    }

    /// Card document tagged with `article` and `link`; `None` on HTTP 404
    async fn fetch_card(&self, article: Article) -> Result<Option<Value>, HarvestError> {
        let url = self
            .card_url(article)
            .ok_or(HarvestError::NoBasketForArticle { article })?;

        let mut rate_limited = 0;
        let mut transport_retries = 0;
        loop {
            let response = match self.client.get(&url).await {
                Ok(response) => response,
                Err(e) => {
                    self.pause_after_transport_error(&url, &mut transport_retries, e).await?;
                    continue;
                }
            };
            match response.status() {
                StatusCode::NOT_FOUND => {
                    warn!("Card not found: {}", url);
                    return Ok(None);
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    rate_limited += 1;
                    if rate_limited > self.config.max_rate_limit_retries {
                        return Err(HarvestError::RateLimitExhausted {
                            article,
                            attempts: rate_limited,
                        });
                    }
                    tokio::time::sleep(Duration::from_millis(self.config.rate_limit_backoff_ms)).await;
                }
                status if status.is_success() => {
                    let body = match response.bytes().await {
                        Ok(body) => body,
                        Err(e) => {
                            self.pause_after_transport_error(&url, &mut transport_retries, e).await?;
                            continue;
                        }
                    };
                    let card: Value = serde_json::from_slice(&body)?;
                    return Ok(Some(tag_record(card, article, &url)));
                }
                status => {
                    return Err(HarvestError::HttpStatus {
                        status: status.as_u16(),
                        url,
                    });
                }
            }
        }
    }

    /// Sleep before the next attempt, or give up with the transport error
    async fn pause_after_transport_error(
        &self,
        url: &str,
        retries: &mut u32,
        error: reqwest::Error,
    ) -> Result<(), HarvestError> {
        if !self.config.retry.should_retry(*retries) {
            return Err(HarvestError::Transport(error));
        }
        *retries += 1;
        let delay = self.config.retry.delay_for(*retries);
        debug!("🔄 Retrying card {} in {:?} (retry {}): {}", url, delay, retries, error);
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

fn tag_record(card: Value, article: Article, url: &str) -> Value {
    match card {
        Value::Object(mut fields) => {
            fields.insert("article".to_string(), json!(article.get()));
            fields.insert("link".to_string(), json!(url));
            Value::Object(fields)
        }
        other => json!({ "article": article.get(), "link": url, "card": other }),
    }
}

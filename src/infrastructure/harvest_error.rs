//! Card harvesting error types
//!
//! Per-article failures are classified so the harvester can log them and
//! move on; none of them aborts a harvest run.

use thiserror::Error;

use crate::domain::Article;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("No basket band covers article {article}")]
    NoBasketForArticle { article: Article },

    #[error("HTTP request failed: {status} - {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Rate limit persisted for article {article} after {attempts} attempts")]
    RateLimitExhausted { article: Article, attempts: u32 },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid card document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

impl HarvestError {
    /// Check if retrying the same article later could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::RateLimitExhausted { .. } | Self::Transport(_) => true,
            Self::NoBasketForArticle { .. } | Self::InvalidDocument(_) => false,
        }
    }
}

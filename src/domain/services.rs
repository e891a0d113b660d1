//! Collaborator traits of the mapping and harvesting services
//!
//! The basket mapper only ever sees these interfaces, so it can be driven by
//! the HTTP adapters in `infrastructure` or by scripted doubles in tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

use super::article::Article;
use super::basket::BasketLabel;
use super::mapping::BasketMapping;

/// Existence oracle: does a basket serve a volume of the catalog?
#[async_trait]
pub trait ExistenceOracle: Send + Sync {
    /// Whether `basket` serves the volume at `volume_index`
    ///
    /// Never fails: inconclusive answers and indices past the end of the
    /// catalog are `false`.
    async fn probe(&self, volume_index: usize, basket: BasketLabel) -> bool;
}

/// Politeness policy applied before every probe
#[async_trait]
pub trait WaitStrategy: Send + Sync {
    async fn wait(&self);
}

/// Source of candidate product identifiers
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load_articles(&self) -> Result<Vec<Article>>;
}

/// Persistence of the basket mapping and harvested records
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn persist_mapping(&self, mapping: &BasketMapping) -> Result<()>;

    /// Append one harvested record
    async fn append_record(&self, record: &serde_json::Value) -> Result<()>;

    /// Articles already present in the record store
    async fn existing_articles(&self) -> Result<HashSet<Article>>;
}

//! File-backed result sink
//!
//! The basket mapping is written as one pretty-printed flat JSON object.
//! Harvested cards are appended to a JSON-lines file, one record per line;
//! the `article` field of each line is what makes a harvest resumable.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::{Article, BasketMapping, ResultSink};

pub struct JsonFileStore {
    mapping_path: PathBuf,
    records_path: PathBuf,
    append_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(mapping_path: impl Into<PathBuf>, records_path: impl Into<PathBuf>) -> Self {
        Self {
            mapping_path: mapping_path.into(),
            records_path: records_path.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn mapping_path(&self) -> &Path {
        &self.mapping_path
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    /// Read a mapping previously written by [`ResultSink::persist_mapping`]
    pub async fn load_mapping(&self) -> Result<BasketMapping> {
        let content = fs::read_to_string(&self.mapping_path)
            .await
            .with_context(|| format!("Failed to read basket map: {}", self.mapping_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid basket map: {}", self.mapping_path.display()))
    }
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[async_trait]
impl ResultSink for JsonFileStore {
    async fn persist_mapping(&self, mapping: &BasketMapping) -> Result<()> {
        ensure_parent(&self.mapping_path).await?;

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        mapping
            .serialize(&mut serializer)
            .context("Failed to serialize basket map")?;

        fs::write(&self.mapping_path, buffer)
            .await
            .with_context(|| format!("Failed to write basket map: {}", self.mapping_path.display()))?;

        info!("💾 Saved {} volume mappings to {}", mapping.len(), self.mapping_path.display());
        Ok(())
    }

    async fn append_record(&self, record: &serde_json::Value) -> Result<()> {
        let mut line = serde_json::to_string(record).context("Failed to serialize record")?;
        line.push('\n');

        let _guard = self.append_lock.lock().await;
        ensure_parent(&self.records_path).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.records_path)
            .await
            .with_context(|| format!("Failed to open records file: {}", self.records_path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn existing_articles(&self) -> Result<HashSet<Article>> {
        if !self.records_path.exists() {
            return Ok(HashSet::new());
        }

        let content = fs::read_to_string(&self.records_path)
            .await
            .with_context(|| format!("Failed to read records file: {}", self.records_path.display()))?;

        let articles: HashSet<Article> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .filter_map(|record| record.get("article").and_then(serde_json::Value::as_u64))
            .map(Article::new)
            .collect();

        debug!("Found {} harvested articles in {}", articles.len(), self.records_path.display());
        Ok(articles)
    }
}

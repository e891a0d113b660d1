//! CSV-backed catalog source
//!
//! Reads product identifiers from the first column of a comma-separated
//! file. Lines whose first field is not an unsigned integer (headers, blank
//! lines, broken rows) are skipped.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::{Article, CatalogSource};

pub struct CsvCatalogSource {
    path: PathBuf,
}

impl CsvCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed articles and the number of skipped lines
    pub fn parse_articles(content: &str) -> (Vec<Article>, usize) {
        let mut articles = Vec::new();
        let mut skipped = 0;

        for line in content.lines() {
            let first = line
                .split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .trim_start_matches('\u{feff}')
                .trim_matches('"');

            match first.parse::<u64>() {
                Ok(id) => articles.push(Article::new(id)),
                Err(_) => skipped += 1,
            }
        }

        (articles, skipped)
    }
}

#[async_trait]
impl CatalogSource for CsvCatalogSource {
    async fn load_articles(&self) -> Result<Vec<Article>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read catalog file: {}", self.path.display()))?;

        let (articles, skipped) = Self::parse_articles(&content);
        if skipped > 0 {
            debug!("Skipped {} unparsable lines in {}", skipped, self.path.display());
        }
        info!("📥 Loaded {} articles from {}", articles.len(), self.path.display());

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parses_first_column_and_skips_garbage() {
        let content = "id,name,price\n1234567,coat,100\n\n  7654321 ,scarf\nabc,def\n\"42\",quoted\n";
        let (articles, skipped) = CsvCatalogSource::parse_articles(content);

        assert_eq!(
            articles,
            vec![Article::new(1_234_567), Article::new(7_654_321), Article::new(42)]
        );
        assert_eq!(skipped, 3);
    }

    #[test]
    fn test_negative_and_overflow_ids_skipped() {
        let (articles, skipped) =
            CsvCatalogSource::parse_articles("-5\n99999999999999999999999\n");
        assert!(articles.is_empty());
        assert_eq!(skipped, 2);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("res.csv");
        std::fs::write(&path, "\u{feff}100001,a\n200002,b\n").unwrap();

        let articles = CsvCatalogSource::new(&path).load_articles().await.unwrap();
        assert_eq!(articles, vec![Article::new(100_001), Article::new(200_002)]);
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let source = CsvCatalogSource::new(dir.path().join("absent.csv"));
        assert!(source.load_articles().await.is_err());
    }
}

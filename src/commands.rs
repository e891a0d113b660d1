//! Command handlers behind the CLI subcommands
//!
//! Each handler wires the configured infrastructure into one application
//! service and reports the outcome.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::{BasketRangeMapper, CardHarvester};
use crate::cli::Commands;
use crate::domain::{Article, BasketBands, CatalogSource, ResultSink, VolumeCatalog};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::{
    CsvCatalogSource, HttpBasketOracle, HttpClient, HttpClientConfig, JsonFileStore, Pacing,
};

/// Fold command-line flags into the loaded configuration
pub fn apply_overrides(config: &mut AppConfig, command: &Commands) {
    match command {
        Commands::Map { catalog, output, delay_ms, max_basket } => {
            if let Some(path) = catalog {
                config.paths.catalog_csv = path.clone();
            }
            if let Some(path) = output {
                config.paths.basket_map = path.clone();
            }
            if let Some(delay) = delay_ms {
                config.probe.delay_ms = *delay;
            }
            if let Some(max) = max_basket {
                config.mapping.max_basket = *max;
            }
        }
        Commands::Ranges { mapping } | Commands::Locate { mapping, .. } => {
            if let Some(path) = mapping {
                config.paths.basket_map = path.clone();
            }
        }
        Commands::Harvest { catalog, mapping, output, concurrency } => {
            if let Some(path) = catalog {
                config.paths.catalog_csv = path.clone();
            }
            if let Some(path) = mapping {
                config.paths.basket_map = path.clone();
            }
            if let Some(path) = output {
                config.paths.records = path.clone();
            }
            if let Some(limit) = concurrency {
                config.harvest.concurrency = *limit;
            }
        }
    }
}

pub async fn dispatch(command: Commands, mut config: AppConfig) -> Result<()> {
    apply_overrides(&mut config, &command);

    match command {
        Commands::Map { .. } => map_volumes(&config).await,
        Commands::Ranges { .. } => print_ranges(&config).await,
        Commands::Locate { article, .. } => locate_article(&config, Article::new(article)).await,
        Commands::Harvest { .. } => harvest_cards(&config).await,
    }
}

fn store_for(config: &AppConfig) -> JsonFileStore {
    JsonFileStore::new(&config.paths.basket_map, &config.paths.records)
}

/// Bands of the saved map; catalog volumes missing from the map end a band
async fn load_bands(store: &JsonFileStore, catalog: Option<&VolumeCatalog>) -> Result<BasketBands> {
    let mapping = store.load_mapping().await?;
    if mapping.is_empty() {
        bail!("Basket map {} is empty; run `map` first", store.mapping_path().display());
    }
    let unmapped = catalog
        .into_iter()
        .flat_map(|catalog| catalog.volumes().iter().copied());
    Ok(BasketBands::from_mapping_excluding(&mapping, unmapped))
}

async fn load_catalog(config: &AppConfig) -> Result<VolumeCatalog> {
    let articles = CsvCatalogSource::new(&config.paths.catalog_csv).load_articles().await?;
    Ok(VolumeCatalog::from_articles(articles))
}

/// Catalog if the CSV exists; without it unmapped volumes cannot be told
/// apart from volumes that were never probed
async fn optional_catalog(config: &AppConfig) -> Result<Option<VolumeCatalog>> {
    if config.paths.catalog_csv.exists() {
        return load_catalog(config).await.map(Some);
    }
    warn!(
        "Catalog {} not found; unmapped volumes inside a band resolve to that band",
        config.paths.catalog_csv.display()
    );
    Ok(None)
}

/// Probe the CDN and write the volume → basket map
pub async fn map_volumes(config: &AppConfig) -> Result<()> {
    let catalog = Arc::new(load_catalog(config).await?);
    info!("📚 Catalog covers {} volumes", catalog.len());

    let last_label = config
        .mapping
        .last_label()
        .context("Invalid mapping.max_basket")?;
    let client = HttpClient::new(HttpClientConfig::for_probes(&config.probe))?;
    let pacing = Pacing::from_config(&config.probe)?;
    let oracle = HttpBasketOracle::new(Arc::clone(&catalog), client, pacing, &config.probe);

    let token = CancellationToken::new();
    let watcher = tokio::spawn({
        let token = token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("🛑 Interrupt received, stopping after the current step");
                token.cancel();
            }
        }
    });

    let report = BasketRangeMapper::new(&catalog, &oracle)
        .with_max_basket(last_label)
        .with_cancellation(token)
        .run()
        .await;
    watcher.abort();

    store_for(config).persist_mapping(&report.mapping).await?;

    if !report.unmapped.is_empty() {
        warn!("⚠️ {} volumes matched no basket", report.unmapped.len());
    }
    if report.cancelled {
        warn!("Mapping interrupted; saved the {} volumes resolved so far", report.mapping.len());
    }
    info!(
        "✅ Mapped {} of {} volumes into {} bands with {} probes",
        report.mapping.len(),
        catalog.len(),
        report.bands.len(),
        report.probes
    );
    Ok(())
}

pub async fn print_ranges(config: &AppConfig) -> Result<()> {
    let catalog = optional_catalog(config).await?;
    let bands = load_bands(&store_for(config), catalog.as_ref()).await?;
    for band in bands.as_slice() {
        println!("{}", band);
    }
    Ok(())
}

pub async fn locate_article(config: &AppConfig, article: Article) -> Result<()> {
    let catalog = optional_catalog(config).await?;
    let bands = load_bands(&store_for(config), catalog.as_ref()).await?;
    let Some(basket) = bands.basket_for(article) else {
        bail!("No basket band covers article {} (volume {})", article, article.volume());
    };

    let host = basket.host(&config.probe.host_pattern);
    println!("article: {}", article);
    println!("volume:  {}", article.volume());
    println!("basket:  {}", basket);
    println!("card:    {}", article.asset_url(&host, &config.harvest.card_asset));
    Ok(())
}

/// Download the cards of every catalog article not yet stored
pub async fn harvest_cards(config: &AppConfig) -> Result<()> {
    let articles = CsvCatalogSource::new(&config.paths.catalog_csv).load_articles().await?;
    let catalog = VolumeCatalog::from_articles(articles.iter().copied());
    let store = Arc::new(store_for(config));
    let bands = load_bands(&store, Some(&catalog)).await?;
    let client = HttpClient::new(HttpClientConfig::for_harvest(&config.harvest, &config.probe.user_agent))?;

    let harvester = CardHarvester::new(
        client,
        bands,
        store,
        config.harvest.clone(),
        config.probe.host_pattern.clone(),
    );
    let summary = harvester.harvest(&articles).await?;

    info!("📊 Harvest summary: {}", serde_json::to_string(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_map_overrides_applied() {
        let mut config = AppConfig::default();
        let command = Commands::Map {
            catalog: Some(PathBuf::from("in.csv")),
            output: None,
            delay_ms: Some(0),
            max_basket: Some(12),
        };

        apply_overrides(&mut config, &command);

        assert_eq!(config.paths.catalog_csv, PathBuf::from("in.csv"));
        assert_eq!(config.paths.basket_map, AppConfig::default().paths.basket_map);
        assert_eq!(config.probe.delay_ms, 0);
        assert_eq!(config.mapping.max_basket, 12);
    }

    #[test]
    fn test_harvest_overrides_applied() {
        let mut config = AppConfig::default();
        let command = Commands::Harvest {
            catalog: None,
            mapping: Some(PathBuf::from("m.json")),
            output: Some(PathBuf::from("cards.json")),
            concurrency: Some(3),
        };

        apply_overrides(&mut config, &command);

        assert_eq!(config.paths.basket_map, PathBuf::from("m.json"));
        assert_eq!(config.paths.records, PathBuf::from("cards.json"));
        assert_eq!(config.harvest.concurrency, 3);
    }

    #[tokio::test]
    async fn test_empty_map_is_rejected() {
        let dir = tempdir().unwrap();
        let map = dir.path().join("map.json");
        std::fs::write(&map, "{}").unwrap();

        let store = JsonFileStore::new(&map, dir.path().join("res.json"));
        assert!(load_bands(&store, None).await.is_err());
    }

    #[tokio::test]
    async fn test_locate_outside_bands_fails() {
        let dir = tempdir().unwrap();
        let map = dir.path().join("map.json");
        std::fs::write(&map, r#"{"12": "01"}"#).unwrap();

        let mut config = AppConfig::default();
        config.paths.basket_map = map;
        config.paths.catalog_csv = dir.path().join("absent.csv");

        assert!(locate_article(&config, Article::new(1_234_567)).await.is_ok());
        assert!(locate_article(&config, Article::new(99_900_000)).await.is_err());
    }

    #[tokio::test]
    async fn test_unresolved_catalog_volume_is_not_located() {
        let dir = tempdir().unwrap();
        let map = dir.path().join("map.json");
        std::fs::write(&map, r#"{"10": "01", "12": "01"}"#).unwrap();
        let csv = dir.path().join("res.csv");
        std::fs::write(&csv, "1000001\n1100001\n1200001\n").unwrap();

        let mut config = AppConfig::default();
        config.paths.basket_map = map;
        config.paths.catalog_csv = csv;

        assert!(locate_article(&config, Article::new(1_000_001)).await.is_ok());
        assert!(locate_article(&config, Article::new(1_100_001)).await.is_err());
        assert!(locate_article(&config, Article::new(1_200_001)).await.is_ok());
    }
}

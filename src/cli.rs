use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "basket-scout")]
#[command(author, version, about = "Map catalog volumes to CDN baskets and harvest product cards")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "BASKET_SCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover which basket serves each catalog volume
    Map {
        /// CSV file whose first column holds product identifiers
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Where to write the volume → basket map
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Pause before every probe in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Highest basket label to try
        #[arg(long)]
        max_basket: Option<u8>,
    },

    /// Print the basket bands of a saved map
    Ranges {
        /// Volume → basket map written by `map`
        #[arg(long)]
        mapping: Option<PathBuf>,
    },

    /// Show the basket and card URL of one article
    Locate {
        /// Product identifier
        article: u64,

        /// Volume → basket map written by `map`
        #[arg(long)]
        mapping: Option<PathBuf>,
    },

    /// Download product cards for every catalog article
    Harvest {
        /// CSV file whose first column holds product identifiers
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Volume → basket map written by `map`
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// JSON-lines file the cards are appended to
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Card downloads in flight
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_map_overrides() {
        let cli = Cli::try_parse_from([
            "basket-scout",
            "--config",
            "custom.json",
            "map",
            "--delay-ms",
            "0",
            "--max-basket",
            "20",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.json")));
        match cli.command {
            Commands::Map { delay_ms, max_basket, catalog, output } => {
                assert_eq!(delay_ms, Some(0));
                assert_eq!(max_basket, Some(20));
                assert!(catalog.is_none());
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_locate() {
        let cli = Cli::try_parse_from(["basket-scout", "locate", "1234567"]).unwrap();
        assert!(matches!(cli.command, Commands::Locate { article: 1_234_567, mapping: None }));
    }

    #[test]
    fn test_locate_requires_numeric_article() {
        assert!(Cli::try_parse_from(["basket-scout", "locate", "abc"]).is_err());
    }
}

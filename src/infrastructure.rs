//! Infrastructure layer for HTTP probing, file storage and configuration
//! 
//! This module provides the concrete collaborators behind the domain traits
//! (existence oracle, pacing, catalog source, result sink) together with
//! configuration and logging.

pub mod basket_oracle;
pub mod config;
pub mod csv_catalog;
pub mod harvest_error;  // Per-article harvest failures
pub mod http_client;
pub mod json_store;
pub mod logging;  // Logging infrastructure
pub mod pacing;
pub mod retry_policy;

// Re-export commonly used items
pub use basket_oracle::{HttpBasketOracle, ProbeOutcome};
pub use config::{AppConfig, ConfigManager};
pub use csv_catalog::CsvCatalogSource;
pub use harvest_error::HarvestError;
pub use http_client::{HttpClient, HttpClientConfig};
pub use json_store::JsonFileStore;
pub use logging::{init_logging_with_config, get_log_directory};
pub use pacing::{FixedDelay, NoDelay, Pacing, RatePacer};
pub use retry_policy::RetryPolicy;

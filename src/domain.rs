//! Domain module - identifiers, basket labels and volume mappings
//! 
//! This module contains the value objects of the marketplace CDN layout
//! and the collaborator traits the mapping and harvesting services depend on.
//! 
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod article;
pub mod bands;
pub mod basket;
pub mod catalog;
pub mod constants;
pub mod errors;
pub mod mapping;
pub mod services;

// Re-export commonly used items for convenience
pub use article::{Article, VolumeId};
pub use bands::{BasketBand, BasketBands};
pub use basket::BasketLabel;
pub use catalog::VolumeCatalog;
pub use errors::DomainError;
pub use mapping::{BasketMapping, MappingReport};
pub use services::{CatalogSource, ExistenceOracle, ResultSink, WaitStrategy};

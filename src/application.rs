//! Application layer module
//! 
//! This module contains the services that orchestrate the domain logic:
//! basket range mapping and card harvesting.

pub mod basket_mapper;
pub mod card_harvester;

pub use basket_mapper::BasketRangeMapper;
pub use card_harvester::{CardHarvester, HarvestSummary};

//! Domain error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Basket label {value} is outside 01..=99")]
    InvalidBasketLabel { value: u64 },

    #[error("Malformed basket label '{text}'")]
    MalformedBasketLabel { text: String },
}

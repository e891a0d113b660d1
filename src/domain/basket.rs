use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::constants::basket::{BASKET_PLACEHOLDER, MAX_LABEL, MIN_LABEL};
use super::errors::DomainError;

/// Basket host label in `01..=99`
///
/// Rendered and serialized as a two-digit zero-padded string (`"07"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BasketLabel(u8);

impl BasketLabel {
    pub const MIN: Self = Self(MIN_LABEL);
    pub const MAX: Self = Self(MAX_LABEL);

    pub fn new(value: u8) -> Result<Self, DomainError> {
        Self::from_wide(u64::from(value))
    }

    fn from_wide(value: u64) -> Result<Self, DomainError> {
        match u8::try_from(value) {
            Ok(label) if (MIN_LABEL..=MAX_LABEL).contains(&label) => Ok(Self(label)),
            _ => Err(DomainError::InvalidBasketLabel { value }),
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Labels from `01` up to and including `last`, ascending
    pub fn up_to(last: Self) -> impl Iterator<Item = Self> {
        (MIN_LABEL..=last.0).map(Self)
    }

    /// Every label, ascending
    pub fn all() -> impl Iterator<Item = Self> {
        Self::up_to(Self::MAX)
    }

    /// Host URL with this label substituted into `pattern`
    pub fn host(self, pattern: &str) -> String {
        pattern.replace(BASKET_PLACEHOLDER, &self.to_string())
    }
}

impl fmt::Display for BasketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for BasketLabel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u64>()
            .map_err(|_| DomainError::MalformedBasketLabel { text: s.to_string() })?;
        Self::from_wide(value)
    }
}

impl TryFrom<String> for BasketLabel {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BasketLabel> for String {
    fn from(label: BasketLabel) -> Self {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_bounds() {
        assert!(BasketLabel::new(0).is_err());
        assert!(BasketLabel::new(100).is_err());
        assert_eq!(BasketLabel::new(1).unwrap(), BasketLabel::MIN);
        assert_eq!(BasketLabel::new(99).unwrap(), BasketLabel::MAX);
    }

    #[test]
    fn test_two_digit_rendering() {
        assert_eq!(BasketLabel::new(3).unwrap().to_string(), "03");
        assert_eq!(BasketLabel::new(42).unwrap().to_string(), "42");
    }

    #[test]
    fn test_parse_label_text() {
        assert_eq!("07".parse::<BasketLabel>().unwrap().get(), 7);
        assert_eq!(" 12 ".parse::<BasketLabel>().unwrap().get(), 12);
        assert_eq!(
            "300".parse::<BasketLabel>(),
            Err(DomainError::InvalidBasketLabel { value: 300 })
        );
        assert!(matches!(
            "b1".parse::<BasketLabel>(),
            Err(DomainError::MalformedBasketLabel { .. })
        ));
    }

    #[test]
    fn test_label_iteration_is_ascending() {
        let labels: Vec<u8> = BasketLabel::all().map(BasketLabel::get).collect();
        assert_eq!(labels.len(), 99);
        assert_eq!(labels.first(), Some(&1));
        assert_eq!(labels.last(), Some(&99));
        assert!(labels.windows(2).all(|w| w[0] < w[1]));

        let last = BasketLabel::new(4).unwrap();
        assert_eq!(BasketLabel::up_to(last).count(), 4);
    }

    #[test]
    fn test_host_substitution() {
        let label = BasketLabel::new(5).unwrap();
        assert_eq!(
            label.host("https://basket-{basket}.wbbasket.ru"),
            "https://basket-05.wbbasket.ru"
        );
    }

    #[test]
    fn test_serde_as_string() {
        let label = BasketLabel::new(9).unwrap();
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"09\"");
        let back: BasketLabel = serde_json::from_str("\"09\"").unwrap();
        assert_eq!(back, label);
        assert!(serde_json::from_str::<BasketLabel>("\"00\"").is_err());
    }
}

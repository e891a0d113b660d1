//! Contiguous basket bands
//!
//! A band is the inclusive volume range one basket serves. Bands are the
//! compact form of a mapping and answer "which basket serves this article"
//! for volumes that were never probed directly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::article::{Article, VolumeId};
use super::basket::BasketLabel;
use super::mapping::BasketMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketBand {
    pub label: BasketLabel,
    pub first: VolumeId,
    pub last: VolumeId,
}

impl BasketBand {
    pub fn contains(&self, volume: VolumeId) -> bool {
        self.first <= volume && volume <= self.last
    }
}

impl fmt::Display for BasketBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}..={}", self.label, self.first, self.last)
    }
}

/// Bands sorted by first volume, non-overlapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasketBands {
    bands: Vec<BasketBand>,
}

impl BasketBands {
    /// Compress a mapping: consecutive entries sharing a label form one band
    pub fn from_mapping(mapping: &BasketMapping) -> Self {
        Self::from_mapping_excluding(mapping, std::iter::empty())
    }

    /// Like [`Self::from_mapping`], but a band never spans one of the
    /// `unmapped` volumes, so those stay unresolved on lookup
    pub fn from_mapping_excluding<I>(mapping: &BasketMapping, unmapped: I) -> Self
    where
        I: IntoIterator<Item = VolumeId>,
    {
        let breaks: BTreeSet<VolumeId> = unmapped
            .into_iter()
            .filter(|volume| !mapping.contains(*volume))
            .collect();

        let mut bands: Vec<BasketBand> = Vec::new();
        for (volume, label) in mapping.iter() {
            match bands.last_mut() {
                Some(band)
                    if band.label == label && breaks.range(band.last..volume).next().is_none() =>
                {
                    band.last = volume;
                }
                _ => bands.push(BasketBand {
                    label,
                    first: volume,
                    last: volume,
                }),
            }
        }
        Self { bands }
    }

    /// Basket serving `volume`; `None` for volumes in a gap between bands
    pub fn lookup(&self, volume: VolumeId) -> Option<BasketLabel> {
        let idx = self.bands.partition_point(|band| band.first <= volume);
        let band = self.bands.get(idx.checked_sub(1)?)?;
        band.contains(volume).then_some(band.label)
    }

    pub fn basket_for(&self, article: Article) -> Option<BasketLabel> {
        self.lookup(article.volume())
    }

    pub fn as_slice(&self) -> &[BasketBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

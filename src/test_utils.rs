//! Test utilities for basket-scout
//!
//! Provides scripted collaborators so the basket mapper can be exercised
//! deterministically, without network access or politeness delays.

use async_trait::async_trait;
use std::ops::RangeInclusive;
use std::sync::Mutex;

use crate::domain::constants::catalog::VOLUME_GROUPING;
use crate::domain::{Article, BasketLabel, ExistenceOracle, VolumeCatalog};

type Answer = Box<dyn Fn(usize, BasketLabel) -> bool + Send + Sync>;

/// Existence oracle answering from a fixed rule and recording every call
pub struct ScriptedOracle {
    len: usize,
    answer: Answer,
    calls: Mutex<Vec<(usize, BasketLabel)>>,
}

impl ScriptedOracle {
    /// Oracle over a catalog of `len` volumes; `answer` is never asked about
    /// indices past the end
    pub fn new<F>(len: usize, answer: F) -> Self
    where
        F: Fn(usize, BasketLabel) -> bool + Send + Sync + 'static,
    {
        Self {
            len,
            answer: Box::new(answer),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Oracle where each `(label, indices)` band is served by exactly that label
    pub fn from_bands(len: usize, bands: &[(u8, RangeInclusive<usize>)]) -> Self {
        let bands = bands.to_vec();
        Self::new(len, move |index, basket| {
            bands
                .iter()
                .any(|(label, range)| *label == basket.get() && range.contains(&index))
        })
    }

    /// Every probe in call order
    pub fn calls(&self) -> Vec<(usize, BasketLabel)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ExistenceOracle for ScriptedOracle {
    async fn probe(&self, volume_index: usize, basket: BasketLabel) -> bool {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((volume_index, basket));
        }
        if volume_index >= self.len {
            return false;
        }
        (self.answer)(volume_index, basket)
    }
}

/// Catalog holding one article for each volume in `volumes`
pub fn catalog_from_volumes(volumes: &[u64]) -> VolumeCatalog {
    VolumeCatalog::from_articles(
        volumes
            .iter()
            .map(|volume| Article::new(volume * VOLUME_GROUPING + 1)),
    )
}

/// Catalog of volumes `0..len`
pub fn sequential_catalog(len: usize) -> VolumeCatalog {
    let volumes: Vec<u64> = (0..len as u64).collect();
    catalog_from_volumes(&volumes)
}

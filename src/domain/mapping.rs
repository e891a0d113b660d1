use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::article::VolumeId;
use super::bands::BasketBand;
use super::basket::BasketLabel;

/// Volume → basket label mapping
///
/// Append-only: once a volume is assigned it keeps its label. Serializes as a
/// flat JSON object, `{"12": "01", "13": "01"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketMapping {
    entries: BTreeMap<VolumeId, BasketLabel>,
}

impl BasketMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `label` for `volume`
    ///
    /// Returns `false` and keeps the existing label when the volume is already mapped.
    pub fn assign(&mut self, volume: VolumeId, label: BasketLabel) -> bool {
        match self.entries.entry(volume) {
            Entry::Vacant(slot) => {
                slot.insert(label);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, volume: VolumeId) -> Option<BasketLabel> {
        self.entries.get(&volume).copied()
    }

    pub fn contains(&self, volume: VolumeId) -> bool {
        self.entries.contains_key(&volume)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending volume order
    pub fn iter(&self) -> impl Iterator<Item = (VolumeId, BasketLabel)> + '_ {
        self.entries.iter().map(|(volume, label)| (*volume, *label))
    }
}

impl FromIterator<(VolumeId, BasketLabel)> for BasketMapping {
    fn from_iter<T: IntoIterator<Item = (VolumeId, BasketLabel)>>(iter: T) -> Self {
        let mut mapping = Self::new();
        for (volume, label) in iter {
            mapping.assign(volume, label);
        }
        mapping
    }
}

/// Outcome of one basket mapping run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingReport {
    pub mapping: BasketMapping,
    /// Resolved bands in discovery order
    pub bands: Vec<BasketBand>,
    /// Volumes no basket label answered for
    pub unmapped: Vec<VolumeId>,
    /// Logical probes issued
    pub probes: u64,
    /// Stopped early through the cancellation token
    pub cancelled: bool,
}

//! Sorted volume catalog built from raw articles

use std::collections::BTreeMap;

use super::article::{Article, VolumeId};

/// Distinct volumes in strictly ascending order, each with one representative article
///
/// Immutable once built; the basket mapper walks it by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeCatalog {
    volumes: Vec<VolumeId>,
    representatives: Vec<Article>,
}

impl VolumeCatalog {
    /// Group `articles` by volume. When several articles share a volume the last one wins.
    pub fn from_articles<I>(articles: I) -> Self
    where
        I: IntoIterator<Item = Article>,
    {
        let mut by_volume: BTreeMap<VolumeId, Article> = BTreeMap::new();
        for article in articles {
            by_volume.insert(article.volume(), article);
        }

        let (volumes, representatives): (Vec<_>, Vec<_>) = by_volume.into_iter().unzip();
        Self {
            volumes,
            representatives,
        }
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn volume_at(&self, index: usize) -> Option<VolumeId> {
        self.volumes.get(index).copied()
    }

    pub fn representative_at(&self, index: usize) -> Option<Article> {
        self.representatives.get(index).copied()
    }

    pub fn volumes(&self) -> &[VolumeId] {
        &self.volumes
    }

    pub fn iter(&self) -> impl Iterator<Item = (VolumeId, Article)> + '_ {
        self.volumes
            .iter()
            .copied()
            .zip(self.representatives.iter().copied())
    }
}

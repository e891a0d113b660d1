use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::catalog::{PART_GROUPING, VOLUME_GROUPING};

/// Raw marketplace product identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Article(u64);

impl Article {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Volume this article belongs to
    pub const fn volume(self) -> VolumeId {
        VolumeId(self.0 / VOLUME_GROUPING)
    }

    /// Part number used in asset paths
    pub const fn part(self) -> u64 {
        self.0 / PART_GROUPING
    }

    /// Absolute URL of `asset` for this article on the basket host `host`
    ///
    /// `host` is the already-substituted basket host, without trailing slash.
    pub fn asset_url(self, host: &str, asset: &str) -> String {
        format!(
            "{}/vol{}/part{}/{}/{}",
            host.trim_end_matches('/'),
            self.volume(),
            self.part(),
            self.0,
            asset.trim_start_matches('/')
        )
    }
}

impl From<u64> for Article {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse group of consecutive articles, the unit a basket serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumeId(u64);

impl VolumeId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for VolumeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

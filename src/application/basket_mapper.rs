//! Basket range mapper
//!
//! Walks the sorted volume catalog once and resolves which basket serves
//! each volume. For the first uncovered volume the basket is found by a
//! linear scan over labels; the run of following volumes served by the same
//! basket is then bounded by exponential doubling and pinned down by binary
//! search, so a band of `n` volumes costs `O(log n)` probes.
//!
//! Bands are assumed to be contiguous: once a basket stops serving a volume
//! it serves no higher volume of the same band. This is not verified.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{
    BasketBand, BasketLabel, BasketMapping, ExistenceOracle, MappingReport, VolumeCatalog,
};

pub struct BasketRangeMapper<'a, O: ExistenceOracle + ?Sized> {
    catalog: &'a VolumeCatalog,
    oracle: &'a O,
    last_label: BasketLabel,
    cancellation: Option<CancellationToken>,
    probes: u64,
}

impl<'a, O> BasketRangeMapper<'a, O>
where
    O: ExistenceOracle + ?Sized,
{
    pub fn new(catalog: &'a VolumeCatalog, oracle: &'a O) -> Self {
        Self {
            catalog,
            oracle,
            last_label: BasketLabel::MAX,
            cancellation: None,
            probes: 0,
        }
    }

    /// Never probe labels above `last`
    #[must_use]
    pub fn with_max_basket(mut self, last: BasketLabel) -> Self {
        self.last_label = last;
        self
    }

    /// Stop between scan steps once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Resolve every volume of the catalog
    ///
    /// Volumes no label answers for are reported as unmapped and skipped one
    /// at a time. A cancelled run returns the ranges committed so far.
    pub async fn run(mut self) -> MappingReport {
        let len = self.catalog.len();
        let mut report = MappingReport::default();
        let mut cursor = 0;

        info!(
            "🔍 Mapping {} volumes onto baskets {}..={}",
            len,
            BasketLabel::MIN,
            self.last_label
        );

        while cursor < len {
            if self.is_cancelled() {
                warn!("🛑 Mapping cancelled at volume index {}/{}", cursor, len);
                report.cancelled = true;
                break;
            }

            let volume = self.catalog.volumes()[cursor];
            let Some(basket) = self.discover_basket(cursor).await else {
                warn!("⚠️ No basket serves vol {}", volume);
                report.unmapped.push(volume);
                cursor += 1;
                continue;
            };

            let boundary = self.find_boundary(cursor, basket).await;
            let band = self.commit(&mut report.mapping, cursor, boundary, basket);
            info!(
                "✅ Basket {} serves vol {}..={} ({} volumes)",
                band.label,
                band.first,
                band.last,
                boundary - cursor + 1
            );
            report.bands.push(band);

            cursor = boundary + 1;
        }

        report.probes = self.probes;
        info!(
            "🎯 Mapped {} volumes in {} bands with {} probes ({} unmapped)",
            report.mapping.len(),
            report.bands.len(),
            report.probes,
            report.unmapped.len()
        );
        report
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    async fn probe(&mut self, index: usize, basket: BasketLabel) -> bool {
        self.probes += 1;
        let hit = self.oracle.probe(index, basket).await;
        debug!(index, basket = %basket, hit, "probe");
        hit
    }

    /// Lowest label serving the volume at `index`
    async fn discover_basket(&mut self, index: usize) -> Option<BasketLabel> {
        for basket in BasketLabel::up_to(self.last_label) {
            if self.probe(index, basket).await {
                return Some(basket);
            }
        }
        None
    }

    /// Highest index still served by `basket`; `start` is known to be served
    async fn find_boundary(&mut self, start: usize, basket: BasketLabel) -> usize {
        let len = self.catalog.len();

        // Doubling: `low` is the last index known to match, `high` the first
        // index known not to (or the end of the catalog).
        let mut low = start;
        let mut high = len;
        let mut jump = 1_usize;
        loop {
            let next = start.saturating_add(jump);
            if next >= len {
                break;
            }
            if self.probe(next, basket).await {
                low = next;
                jump = jump.saturating_mul(2);
            } else {
                high = next;
                break;
            }
        }

        // Last true in the open interval (low, high)
        let mut boundary = low;
        let mut lo = low + 1;
        while lo < high {
            let mid = lo + (high - lo) / 2;
            if self.probe(mid, basket).await {
                boundary = mid;
                lo = mid + 1;
            } else {
                high = mid;
            }
        }
        boundary
    }

    fn commit(
        &self,
        mapping: &mut BasketMapping,
        start: usize,
        boundary: usize,
        basket: BasketLabel,
    ) -> BasketBand {
        let volumes = &self.catalog.volumes()[start..=boundary];
        for &volume in volumes {
            mapping.assign(volume, basket);
        }
        BasketBand {
            label: basket,
            first: volumes[0],
            last: volumes[volumes.len() - 1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedOracle, sequential_catalog};

    fn label(value: u8) -> BasketLabel {
        BasketLabel::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_empty_catalog_issues_no_probes() {
        let catalog = VolumeCatalog::default();
        let oracle = ScriptedOracle::new(0, |_, _| true);

        let report = BasketRangeMapper::new(&catalog, &oracle).run().await;

        assert!(report.mapping.is_empty());
        assert_eq!(report.probes, 0);
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_single_volume_single_probe() {
        let catalog = sequential_catalog(1);
        let oracle = ScriptedOracle::new(1, |_, basket| basket.get() == 1);

        let report = BasketRangeMapper::new(&catalog, &oracle).run().await;

        assert_eq!(report.mapping.len(), 1);
        assert_eq!(report.probes, 1);
        assert_eq!(oracle.calls(), vec![(0, label(1))]);
    }

    #[tokio::test]
    async fn test_lowest_matching_label_wins() {
        let catalog = sequential_catalog(3);
        let oracle = ScriptedOracle::new(3, |_, basket| basket.get() >= 4);

        let report = BasketRangeMapper::new(&catalog, &oracle).run().await;

        assert!(report.mapping.iter().all(|(_, basket)| basket == label(4)));
    }

    #[tokio::test]
    async fn test_max_basket_limits_discovery() {
        let catalog = sequential_catalog(2);
        let oracle = ScriptedOracle::new(2, |_, basket| basket.get() == 9);

        let report = BasketRangeMapper::new(&catalog, &oracle)
            .with_max_basket(label(5))
            .run()
            .await;

        assert!(report.mapping.is_empty());
        assert_eq!(report.unmapped.len(), 2);
        assert!(oracle.calls().iter().all(|(_, basket)| basket.get() <= 5));
        assert_eq!(report.probes, 10);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_returns_empty_report() {
        let catalog = sequential_catalog(4);
        let oracle = ScriptedOracle::new(4, |_, _| true);
        let token = CancellationToken::new();
        token.cancel();

        let report = BasketRangeMapper::new(&catalog, &oracle)
            .with_cancellation(token)
            .run()
            .await;

        assert!(report.cancelled);
        assert!(report.mapping.is_empty());
        assert_eq!(oracle.call_count(), 0);
    }
}

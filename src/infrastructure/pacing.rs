//! Politeness pacing between probes
//!
//! Wait strategies keep the probe rate below the level that trips the CDN's
//! abuse defenses. They trade throughput for safety and play no part in the
//! correctness of the mapping, so tests run with [`NoDelay`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{Quota, RateLimiter, clock::DefaultClock, state::{InMemoryState, direct::NotKeyed}};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::domain::WaitStrategy;
use crate::infrastructure::config::ProbeConfig;

/// No pause at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl WaitStrategy for NoDelay {
    async fn wait(&self) {}
}

/// Same pause before every probe
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl WaitStrategy for FixedDelay {
    async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Token bucket allowing bursts up to the per-second quota
pub struct RatePacer {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RatePacer {
    pub fn per_second(requests: u32) -> Result<Self> {
        let quota = Quota::per_second(
            NonZeroU32::new(requests)
                .context("Rate limit must be greater than 0")?
        );
        Ok(Self {
            limiter: RateLimiter::direct(quota),
        })
    }
}

#[async_trait]
impl WaitStrategy for RatePacer {
    async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

/// Wait strategy chosen from configuration
pub enum Pacing {
    None(NoDelay),
    Fixed(FixedDelay),
    Rate(RatePacer),
}

impl Pacing {
    /// Rate pacing when `max_requests_per_second` is set, otherwise the fixed
    /// delay, otherwise nothing
    pub fn from_config(probe: &ProbeConfig) -> Result<Self> {
        if probe.max_requests_per_second > 0 {
            return Ok(Self::Rate(RatePacer::per_second(probe.max_requests_per_second)?));
        }
        if probe.delay_ms > 0 {
            return Ok(Self::Fixed(FixedDelay::from_millis(probe.delay_ms)));
        }
        Ok(Self::None(NoDelay))
    }
}

#[async_trait]
impl WaitStrategy for Pacing {
    async fn wait(&self) {
        match self {
            Self::None(strategy) => strategy.wait().await,
            Self::Fixed(strategy) => strategy.wait().await,
            Self::Rate(strategy) => strategy.wait().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_fixed_delay_sleeps() {
        let pacer = FixedDelay::from_millis(20);
        let started = Instant::now();
        pacer.wait().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_no_delay_returns_immediately() {
        let started = Instant::now();
        for _ in 0..100 {
            NoDelay.wait().await;
        }
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(RatePacer::per_second(0).is_err());
    }

    #[test]
    fn test_pacing_selection() {
        let mut probe = ProbeConfig::default();
        assert!(matches!(Pacing::from_config(&probe).unwrap(), Pacing::Fixed(_)));

        probe.max_requests_per_second = 5;
        assert!(matches!(Pacing::from_config(&probe).unwrap(), Pacing::Rate(_)));

        probe.max_requests_per_second = 0;
        probe.delay_ms = 0;
        assert!(matches!(Pacing::from_config(&probe).unwrap(), Pacing::None(_)));
    }
}

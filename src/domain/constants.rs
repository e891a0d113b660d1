//! Marketplace CDN layout constants
//!
//! Identifier grouping rules and URL shapes of the basket hosts, plus the
//! default politeness and harvesting limits.

/// Identifier grouping rules
pub mod catalog {
    /// Articles are grouped into volumes of this many consecutive ids
    ///
    /// A volume is the unit a basket host serves: every article of a volume
    /// lives on the same basket.
    pub const VOLUME_GROUPING: u64 = 100_000;

    /// Articles are grouped into parts of this many consecutive ids (URL path only)
    pub const PART_GROUPING: u64 = 1_000;
}

/// Basket host layout
pub mod basket {
    /// Lowest basket label
    pub const MIN_LABEL: u8 = 1;

    /// Highest basket label
    pub const MAX_LABEL: u8 = 99;

    /// Placeholder substituted with the two-digit label in host patterns
    pub const BASKET_PLACEHOLDER: &str = "{basket}";

    /// Basket host URL pattern
    pub const HOST_PATTERN: &str = "https://basket-{basket}.wbbasket.ru";

    /// Asset probed to decide whether a basket serves a volume
    pub const PROBE_ASSET: &str = "images/big/1.webp";

    /// Product card document served next to the images
    pub const CARD_ASSET: &str = "info/ru/card.json";
}

/// Existence probe defaults
pub mod probing {
    /// Pause before every probe (milliseconds)
    pub const DEFAULT_PROBE_DELAY_MS: u64 = 100;

    /// Probe request timeout (seconds)
    pub const DEFAULT_PROBE_TIMEOUT_SECONDS: u64 = 3;

    /// User agent sent with probes and card downloads
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";
}

/// Card harvesting defaults
pub mod harvest {
    /// Card downloads in flight
    pub const DEFAULT_CONCURRENCY: usize = 15;

    /// Wait after an HTTP 429 before asking again (milliseconds)
    pub const DEFAULT_RATE_LIMIT_BACKOFF_MS: u64 = 1_000;

    /// HTTP 429 answers tolerated per card before giving up
    pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 5;

    /// Card request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

    /// Retries after a card request times out or cannot connect
    pub const DEFAULT_TRANSPORT_RETRIES: u32 = 4;

    /// Pause between those retries (milliseconds)
    pub const DEFAULT_TRANSPORT_RETRY_DELAY_MS: u64 = 2_000;
}

// ── Runtime store configuration ──
//
// Tuning knobs for the state core. Core never touches disk: the CLI
// (via catalog-config) constructs a `StoreConfig` and hands it in.

use std::time::Duration;

/// Default quiet period before a filter edit turns into a fetch.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Default freshness window for the shared dropdown lookups.
pub const DEFAULT_DROPDOWN_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Page size used for every domain list. Must be > 0.
    pub page_size: u32,
    /// Maximum age at which dropdown lookups are served without refetching.
    pub dropdown_ttl: Duration,
    /// Quiet period for the filter debounce pipeline.
    pub debounce_quiet: Duration,
    /// Request timeout handed to the HTTP transport.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            dropdown_ttl: DEFAULT_DROPDOWN_TTL,
            debounce_quiet: DEFAULT_DEBOUNCE,
            timeout: Duration::from_secs(30),
        }
    }
}

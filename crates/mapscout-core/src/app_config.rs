use std::time::Duration;

pub const DEFAULT_MAPS_URL: &str = "https://www.google.com/maps";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Tunables for one scrape run.
///
/// Every field has a default; see [`crate::config`] for the environment
/// variables that override them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeConfig {
    /// Maximum number of listings to discover and process.
    pub target_total: usize,
    /// Wall-clock ceiling for the whole run, checked at loop boundaries.
    pub max_duration_secs: u64,
    pub headless: bool,
    /// Pause after opening a listing before its detail fields are read.
    pub item_settle_ms: u64,
    /// Pause after each scroll before re-counting candidates.
    pub scroll_settle_ms: u64,
    /// Consecutive no-growth scroll iterations that end discovery.
    pub stability_threshold: u32,
    pub maps_url: String,
    pub webdriver_url: String,
    pub webdriver_timeout_secs: u64,
    pub log_level: String,
}

impl ScrapeConfig {
    #[must_use]
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    #[must_use]
    pub fn item_settle(&self) -> Duration {
        Duration::from_millis(self.item_settle_ms)
    }

    #[must_use]
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            target_total: 100,
            max_duration_secs: 120,
            headless: true,
            item_settle_ms: 3_000,
            scroll_settle_ms: 1_200,
            stability_threshold: 6,
            maps_url: DEFAULT_MAPS_URL.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            webdriver_timeout_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

use crate::app_config::{ScrapeConfig, DEFAULT_MAPS_URL, DEFAULT_WEBDRIVER_URL};
use crate::ConfigError;

/// Load scrape configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that does not parse.
pub fn load_scrape_config() -> Result<ScrapeConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_scrape_config_from_env()
}

/// Load scrape configuration from environment variables already in the process.
///
/// Unlike [`load_scrape_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that does not parse.
pub fn load_scrape_config_from_env() -> Result<ScrapeConfig, ConfigError> {
    build_scrape_config(|key| std::env::var(key))
}

/// Build scrape configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap`.
fn build_scrape_config<F>(lookup: F) -> Result<ScrapeConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let target_total = parse_usize("MAPSCOUT_TARGET_TOTAL", "100")?;
    let max_duration_secs = parse_u64("MAPSCOUT_MAX_DURATION_SECS", "120")?;
    let headless = parse_flag(&or_default("MAPSCOUT_HEADLESS", "true"));
    let item_settle_ms = parse_u64("MAPSCOUT_ITEM_SETTLE_MS", "3000")?;
    let scroll_settle_ms = parse_u64("MAPSCOUT_SCROLL_SETTLE_MS", "1200")?;
    let stability_threshold = parse_stability_threshold(&or_default(
        "MAPSCOUT_STABILITY_THRESHOLD",
        "6",
    ))?;
    let maps_url = or_default("MAPSCOUT_MAPS_URL", DEFAULT_MAPS_URL);
    let webdriver_url = or_default("MAPSCOUT_WEBDRIVER_URL", DEFAULT_WEBDRIVER_URL);
    let webdriver_timeout_secs = parse_u64("MAPSCOUT_WEBDRIVER_TIMEOUT_SECS", "60")?;
    let log_level = or_default("MAPSCOUT_LOG_LEVEL", "info");

    Ok(ScrapeConfig {
        target_total,
        max_duration_secs,
        headless,
        item_settle_ms,
        scroll_settle_ms,
        stability_threshold,
        maps_url,
        webdriver_url,
        webdriver_timeout_secs,
        log_level,
    })
}

/// Interpret a boolean-ish flag value.
///
/// `true`, `1` and `yes` (any case) are truthy; everything else is false.
#[must_use]
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

fn parse_stability_threshold(raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "MAPSCOUT_STABILITY_THRESHOLD".to_string(),
        reason,
    };
    let value = raw.trim().parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    if value == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

pub mod app_config;
pub mod business;
pub mod config;

pub use app_config::ScrapeConfig;
pub use business::{Business, BusinessCollection};
pub use config::{load_scrape_config, load_scrape_config_from_env, parse_flag};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

mod queries;
mod sink;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mapscout_core::ScrapeConfig;
use mapscout_scraper::{scrape_query, WebDriverSurface};
use tracing_subscriber::EnvFilter;

use crate::sink::JsonLinesSink;

#[derive(Debug, Parser)]
#[command(name = "mapscout")]
#[command(about = "Collect Google Maps listings for search queries as JSON lines")]
struct Cli {
    /// Single search query; without it queries are read from --input.
    #[arg(short = 's', long)]
    search: Option<String>,

    /// Maximum listings to collect per query.
    #[arg(short = 't', long)]
    total: Option<usize>,

    /// Time budget per query, in seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Run the browser headless: true/false.
    #[arg(long, value_parser = parse_bool_arg)]
    headless: Option<bool>,

    /// Wait after opening each listing, in seconds.
    #[arg(long, value_name = "SECS")]
    wait: Option<f64>,

    /// Wait after each scroll, in seconds.
    #[arg(long, value_name = "SECS")]
    scroll_wait: Option<f64>,

    /// Consecutive scrolls without new listings before discovery stops.
    #[arg(long)]
    stability: Option<u32>,

    /// Query file, one query per line.
    #[arg(long, default_value = "input.txt")]
    input: PathBuf,
}

#[allow(clippy::unnecessary_wraps)]
fn parse_bool_arg(raw: &str) -> Result<bool, String> {
    Ok(mapscout_core::parse_flag(raw))
}

fn seconds_to_millis(flag: &str, secs: f64) -> anyhow::Result<u64> {
    let duration = Duration::try_from_secs_f64(secs)
        .with_context(|| format!("--{flag} must be a non-negative number of seconds"))?;
    Ok(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

impl Cli {
    /// Layers command-line overrides on top of the environment config.
    fn apply(&self, mut config: ScrapeConfig) -> anyhow::Result<ScrapeConfig> {
        if let Some(total) = self.total {
            config.target_total = total;
        }
        if let Some(timeout) = self.timeout {
            config.max_duration_secs = timeout;
        }
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        if let Some(wait) = self.wait {
            config.item_settle_ms = seconds_to_millis("wait", wait)?;
        }
        if let Some(wait) = self.scroll_wait {
            config.scroll_settle_ms = seconds_to_millis("scroll-wait", wait)?;
        }
        if let Some(stability) = self.stability {
            anyhow::ensure!(stability >= 1, "--stability must be at least 1");
            config.stability_threshold = stability;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.apply(mapscout_core::load_scrape_config()?)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let queries = queries::load_queries(cli.search.as_deref(), &cli.input)?;
    tracing::info!(
        queries = queries.len(),
        target_total = config.target_total,
        max_duration_secs = config.max_duration_secs,
        headless = config.headless,
        "starting scrape"
    );

    let mut sink = JsonLinesSink::new(std::io::BufWriter::new(std::io::stdout()));
    let mut aborted_queries = 0usize;

    for query in &queries {
        let surface = WebDriverSurface::connect(&config).await.with_context(|| {
            format!(
                "failed to start a browser session at {}",
                config.webdriver_url
            )
        })?;

        match scrape_query(surface, &config, query).await {
            Ok(report) => {
                sink.write_all(&report.businesses)?;
                tracing::info!(
                    query = %report.query,
                    discovery = %report.discovery,
                    handles = report.handles_found,
                    rows = report.businesses.len(),
                    failed = report.failed,
                    "query complete"
                );
            }
            Err(aborted) => {
                sink.write_all(&aborted.partial)?;
                aborted_queries += 1;
                tracing::error!(query = %query, error = %aborted, "query aborted");
            }
        }
    }

    tracing::info!(
        queries = queries.len(),
        aborted = aborted_queries,
        rows = sink.written(),
        "all queries processed"
    );
    anyhow::ensure!(
        aborted_queries < queries.len(),
        "every query aborted; see the log for details"
    );
    Ok(())
}

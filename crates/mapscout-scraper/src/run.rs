//! End-to-end scrape of one search query.

use std::time::Duration;

use mapscout_core::{BusinessCollection, ScrapeConfig};

use crate::accumulator::{accumulate_records, AccumulationStop};
use crate::budget::Budget;
use crate::discovery::{discover_listings, DiscoverySettings, DiscoveryStop};
use crate::error::{RunAborted, ScrapeError, SurfaceError};
use crate::resolver::{ExtractionPlan, FieldResolver};
use crate::selectors::{LISTING_ANCHOR, SEARCH_INPUT};
use crate::surface::{AutomationSurface, SessionGuard};

const HOME_SETTLE: Duration = Duration::from_secs(2);
const RELOAD_SETTLE: Duration = Duration::from_secs(3);
const TYPE_SETTLE: Duration = Duration::from_millis(500);
const RESULTS_SETTLE: Duration = Duration::from_secs(4);
const SCROLL_DELTA: (i64, i64) = (0, 10_000);

/// Outcome of a run that finished without losing its session.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub query: String,
    pub businesses: BusinessCollection,
    pub discovery: DiscoveryStop,
    /// Listing handles discovery handed to the per-listing loop.
    pub handles_found: usize,
    pub accumulation: AccumulationStop,
    /// Listings skipped because of a per-listing failure.
    pub failed: usize,
}

/// Searches for `query` and extracts up to `config.target_total` records.
///
/// Takes ownership of `surface` and closes it on every exit path.
///
/// # Errors
///
/// Returns [`RunAborted`] when the search page cannot be prepared or the
/// session fails; records gathered before a session failure travel with it.
pub async fn scrape_query<S>(
    surface: S,
    config: &ScrapeConfig,
    query: &str,
) -> Result<ScrapeReport, RunAborted>
where
    S: AutomationSurface + 'static,
{
    let budget = Budget::start(config.max_duration());
    let guard = SessionGuard::new(surface);

    let outcome = run_session(guard.surface(), config, query, &budget).await;

    // Close errors are logged by the guard; they do not change the outcome.
    let _ = guard.close().await;

    match &outcome {
        Ok(report) => tracing::info!(
            query,
            records = report.businesses.len(),
            discovery = %report.discovery,
            accumulation = %report.accumulation,
            failed = report.failed,
            elapsed_ms = u64::try_from(budget.elapsed().as_millis()).unwrap_or(u64::MAX),
            "scraping finished"
        ),
        Err(aborted) => tracing::error!(
            query,
            records = aborted.partial.len(),
            error = %aborted.error,
            "scraping aborted"
        ),
    }
    outcome
}

async fn run_session<S>(
    surface: &S,
    config: &ScrapeConfig,
    query: &str,
    budget: &Budget,
) -> Result<ScrapeReport, RunAborted>
where
    S: AutomationSurface,
{
    open_search(surface, &config.maps_url, query)
        .await
        .map_err(RunAborted::empty)?;

    let settings = DiscoverySettings {
        listing_selector: LISTING_ANCHOR,
        target_total: config.target_total,
        stability_threshold: config.stability_threshold,
        scroll_settle: config.scroll_settle(),
        scroll_delta: SCROLL_DELTA,
    };
    let discovery = discover_listings(surface, &settings, budget)
        .await
        .map_err(RunAborted::empty)?;

    let plan = ExtractionPlan::default();
    let resolver = FieldResolver::new(surface, &plan, config.item_settle());
    let accumulation = accumulate_records(
        &resolver,
        &discovery.handles,
        query,
        config.target_total,
        budget,
    )
    .await?;

    Ok(ScrapeReport {
        query: query.to_owned(),
        businesses: accumulation.businesses,
        discovery: discovery.stop,
        handles_found: discovery.handles.len(),
        accumulation: accumulation.stop,
        failed: accumulation.failed,
    })
}

/// Loads the maps home page and submits `query` in its search box.
async fn open_search<S>(surface: &S, maps_url: &str, query: &str) -> Result<(), ScrapeError>
where
    S: AutomationSurface,
{
    tracing::info!(maps_url, "opening maps");
    surface
        .navigate(maps_url)
        .await
        .map_err(|e| setup_error("open the maps page", e))?;
    tokio::time::sleep(HOME_SETTLE).await;

    tracing::info!(query, "searching");
    let inputs = surface
        .count(SEARCH_INPUT)
        .await
        .map_err(|e| setup_error("locate the search box", e))?;
    if inputs == 0 {
        tracing::warn!("search input not found on page; reloading");
        let current = surface
            .current_url()
            .await
            .map_err(|e| setup_error("read the current location", e))?;
        surface
            .navigate(&current)
            .await
            .map_err(|e| setup_error("reload the maps page", e))?;
        tokio::time::sleep(RELOAD_SETTLE).await;
    }

    surface
        .fill(SEARCH_INPUT, query)
        .await
        .map_err(|e| setup_error("type the query", e))?;
    tokio::time::sleep(TYPE_SETTLE).await;
    surface
        .press_key("Enter")
        .await
        .map_err(|e| setup_error("submit the query", e))?;
    tokio::time::sleep(RESULTS_SETTLE).await;

    // Hovering the feed makes lazy loading kick in; failure is harmless.
    match surface.find_all(LISTING_ANCHOR).await {
        Ok(anchors) => {
            if let Some(first) = anchors.first() {
                if let Err(e) = surface.hover(first).await {
                    if e.is_session() {
                        return Err(ScrapeError::SessionFailure(e));
                    }
                }
            }
        }
        Err(e) if e.is_session() => return Err(ScrapeError::SessionFailure(e)),
        Err(_) => {}
    }

    Ok(())
}

fn setup_error(step: &'static str, source: SurfaceError) -> ScrapeError {
    if source.is_session() {
        ScrapeError::SessionFailure(source)
    } else {
        ScrapeError::Setup { step, source }
    }
}

//! Scroll-and-count discovery of listing handles.
//!
//! Each iteration scrolls the results feed once, waits for new cards to
//! render, and re-counts. The loop ends when enough candidates are present,
//! when the count stops growing for `stability_threshold` iterations in a
//! row, or when the budget runs out.

use std::time::Duration;

use crate::budget::Budget;
use crate::error::{recoverable, ScrapeError};
use crate::surface::AutomationSurface;

/// Why discovery stopped. The handle list has the same shape in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStop {
    /// At least `target_total` candidates were loaded.
    TargetReached,
    /// The count stopped growing; no more candidates will load.
    Exhausted,
    /// The budget expired before either of the above.
    TimeLimited,
}

impl std::fmt::Display for DiscoveryStop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryStop::TargetReached => write!(f, "target_reached"),
            DiscoveryStop::Exhausted => write!(f, "exhausted"),
            DiscoveryStop::TimeLimited => write!(f, "time_limited"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoverySettings<'a> {
    pub listing_selector: &'a str,
    pub target_total: usize,
    pub stability_threshold: u32,
    pub scroll_settle: Duration,
    /// Wheel delta applied per iteration, `(x, y)`.
    pub scroll_delta: (i64, i64),
}

/// Result of a discovery pass: at most `target_total` handles, in the order
/// the surface reported them.
#[derive(Debug, Clone)]
pub struct Discovery<E> {
    pub handles: Vec<E>,
    pub stop: DiscoveryStop,
    /// Scroll iterations performed.
    pub iterations: u32,
}

/// Scrolls the results feed until enough listings are loaded, loading
/// stalls, or the budget expires.
///
/// Per-operation scroll and count failures are logged and treated as "no
/// growth" for that iteration.
///
/// # Errors
///
/// Returns [`ScrapeError::SessionFailure`] if the surface becomes unusable.
pub async fn discover_listings<S>(
    surface: &S,
    settings: &DiscoverySettings<'_>,
    budget: &Budget,
) -> Result<Discovery<S::Element>, ScrapeError>
where
    S: AutomationSurface,
{
    if settings.target_total == 0 {
        tracing::info!("target total is zero; skipping discovery");
        return Ok(Discovery {
            handles: Vec::new(),
            stop: DiscoveryStop::TargetReached,
            iterations: 0,
        });
    }

    let (delta_x, delta_y) = settings.scroll_delta;
    let mut baseline = 0usize;
    let mut stable_iterations = 0u32;
    let mut iterations = 0u32;

    let stop = loop {
        if budget.expired() {
            tracing::warn!(iterations, "time limit reached while scrolling");
            break DiscoveryStop::TimeLimited;
        }
        iterations += 1;

        if let Err(err) = surface.scroll(delta_x, delta_y).await {
            let err = recoverable(err)?;
            tracing::warn!(error = %err, "scroll failed; re-counting anyway");
        }
        tokio::time::sleep(settings.scroll_settle).await;

        let count = match surface.count(settings.listing_selector).await {
            Ok(count) => count,
            Err(err) => {
                let err = recoverable(err)?;
                tracing::warn!(error = %err, "counting listings failed; assuming no growth");
                baseline
            }
        };
        tracing::info!(count, target = settings.target_total, "currently found listings");

        if count >= settings.target_total {
            tracing::info!(count, target = settings.target_total, "desired amount reached");
            break DiscoveryStop::TargetReached;
        }

        if count == baseline {
            stable_iterations += 1;
        } else {
            stable_iterations = 0;
            baseline = count;
        }

        if stable_iterations >= settings.stability_threshold {
            tracing::info!(count, stable_iterations, "no more listings loading after scrolling");
            break DiscoveryStop::Exhausted;
        }
    };

    let mut handles = match surface.find_all(settings.listing_selector).await {
        Ok(handles) => handles,
        Err(err) => {
            let err = recoverable(err)?;
            tracing::warn!(error = %err, "failed to gather listing handles");
            Vec::new()
        }
    };
    handles.truncate(settings.target_total);
    tracing::info!(handles = handles.len(), %stop, iterations, "discovery finished");

    Ok(Discovery {
        handles,
        stop,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selectors::LISTING_ANCHOR;
    use crate::surface::fake::{FakeElement, FakeSurface};

    fn settings(target_total: usize, stability_threshold: u32) -> DiscoverySettings<'static> {
        DiscoverySettings {
            listing_selector: LISTING_ANCHOR,
            target_total,
            stability_threshold,
            scroll_settle: Duration::from_millis(1_200),
            scroll_delta: (0, 10_000),
        }
    }

    fn long_budget() -> Budget {
        Budget::start(Duration::from_secs(3_600))
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_count_ends_exhausted_with_all_loaded_handles() {
        let surface = FakeSurface::new().with_counts([5, 12, 12, 12, 12, 12, 12]);
        let discovery = discover_listings(&surface, &settings(50, 6), &long_budget())
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::Exhausted);
        assert_eq!(discovery.handles.len(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_needs_threshold_consecutive_stalls() {
        // 5 -> 12 resets the counter; six further 12s are needed.
        let surface = FakeSurface::new().with_counts([5, 12, 12, 12, 12, 12, 12]);
        let log = surface.log();
        let discovery = discover_listings(&surface, &settings(50, 6), &long_budget())
            .await
            .unwrap();
        assert_eq!(discovery.iterations, 8);
        assert_eq!(log.count("scroll"), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn growth_resets_the_stability_counter() {
        let surface = FakeSurface::new().with_counts([3, 3, 7, 7, 7]);
        let discovery = discover_listings(&surface, &settings(50, 2), &long_budget())
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::Exhausted);
        assert_eq!(discovery.iterations, 5);
        assert_eq!(discovery.handles.len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn reaching_target_truncates_in_discovery_order() {
        let surface = FakeSurface::new().with_counts([8, 20, 64]);
        let discovery = discover_listings(&surface, &settings(50, 6), &long_budget())
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::TargetReached);
        assert_eq!(discovery.handles.len(), 50);
        let expected: Vec<FakeElement> = (0..50).map(FakeElement::Listing).collect();
        assert_eq!(discovery.handles, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn exact_target_count_is_success() {
        let surface = FakeSurface::new().with_counts([10]);
        let discovery = discover_listings(&surface, &settings(10, 6), &long_budget())
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::TargetReached);
        assert_eq!(discovery.iterations, 1);
        assert_eq!(discovery.handles.len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_target_returns_immediately_without_scrolling() {
        let surface = FakeSurface::new().with_counts([10]);
        let log = surface.log();
        let discovery = discover_listings(&surface, &settings(0, 6), &long_budget())
            .await
            .unwrap();
        assert!(discovery.handles.is_empty());
        assert_eq!(discovery.iterations, 0);
        assert_eq!(log.count("scroll"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_candidates_eventually_exhausts() {
        let surface = FakeSurface::new().with_counts([0]);
        let discovery = discover_listings(&surface, &settings(20, 6), &long_budget())
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::Exhausted);
        assert_eq!(discovery.iterations, 6);
        assert!(discovery.handles.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_budget_stops_before_scrolling() {
        let surface = FakeSurface::new().with_counts([10]);
        let log = surface.log();
        let budget = Budget::start(Duration::ZERO);
        let discovery = discover_listings(&surface, &settings(20, 6), &budget)
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::TimeLimited);
        assert_eq!(log.count("scroll"), 0);
        assert!(discovery.handles.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn budget_expiry_keeps_what_was_loaded() {
        // 1.2s per iteration against a 5s budget: iterations start at
        // 0, 1.2, 2.4, 3.6 and 4.8s; the check at 6.0s stops the loop.
        let surface = FakeSurface::new().with_counts(1..=100);
        let budget = Budget::start(Duration::from_secs(5));
        let discovery = discover_listings(&surface, &settings(100, 6), &budget)
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::TimeLimited);
        assert_eq!(discovery.iterations, 5);
        assert_eq!(discovery.handles.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_scrolls_are_tolerated_and_counting_continues() {
        let surface = FakeSurface::new()
            .with_counts([2, 4, 9])
            .failing_scrolls(2);
        let log = surface.log();
        let discovery = discover_listings(&surface, &settings(9, 6), &long_budget())
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::TargetReached);
        assert_eq!(discovery.iterations, 3);
        assert_eq!(discovery.handles.len(), 9);
        assert_eq!(log.count("scroll"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_count_counts_as_no_growth() {
        // Two failed counts hold the baseline at zero, 5 resets it, and
        // three stalls at 5 end the loop on the sixth iteration.
        let surface = FakeSurface::new().with_counts([5]).failing_counts(2);
        let discovery = discover_listings(&surface, &settings(50, 3), &long_budget())
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::Exhausted);
        assert_eq!(discovery.iterations, 6);
        assert_eq!(discovery.handles.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_count_does_not_block_reaching_target() {
        let surface = FakeSurface::new().with_counts([3, 8]).failing_counts(1);
        let discovery = discover_listings(&surface, &settings(8, 6), &long_budget())
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::TargetReached);
        assert_eq!(discovery.iterations, 3);
        assert_eq!(discovery.handles.len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_handle_lookup_yields_no_handles() {
        let surface = FakeSurface::new().with_counts([4]).failing_listing_lookup();
        let discovery = discover_listings(&surface, &settings(4, 6), &long_budget())
            .await
            .unwrap();
        assert_eq!(discovery.stop, DiscoveryStop::TargetReached);
        assert!(discovery.handles.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn session_failure_propagates() {
        let surface = FakeSurface::new().with_counts([1]).session_dies_at(0);
        // Kill the session through a click, then try to discover.
        let _ = surface.click(&FakeElement::Listing(0)).await;
        let result = discover_listings(&surface, &settings(10, 6), &long_budget()).await;
        assert!(matches!(result, Err(ScrapeError::SessionFailure(_))));
    }
}

//! Per-listing processing loop.
//!
//! One failed listing is logged and skipped; only a lost session ends the
//! loop early, and even then the records gathered so far are returned.

use mapscout_core::BusinessCollection;

use crate::budget::Budget;
use crate::error::RunAborted;
use crate::resolver::FieldResolver;
use crate::surface::AutomationSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulationStop {
    /// Every handle was attempted.
    Completed,
    /// The budget expired with handles still unprocessed.
    BudgetExpired,
}

impl std::fmt::Display for AccumulationStop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccumulationStop::Completed => write!(f, "completed"),
            AccumulationStop::BudgetExpired => write!(f, "budget_expired"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Accumulation {
    pub businesses: BusinessCollection,
    pub stop: AccumulationStop,
    /// Handles skipped because of a per-listing failure.
    pub failed: usize,
}

/// Resolves each handle in order and collects the resulting records.
///
/// `target_total` is only used for progress reporting; the handle list is
/// expected to be bounded already.
///
/// # Errors
///
/// Returns [`RunAborted`] carrying the partial collection when the surface
/// reports a session failure.
pub async fn accumulate_records<S>(
    resolver: &FieldResolver<'_, S>,
    handles: &[S::Element],
    query: &str,
    target_total: usize,
    budget: &Budget,
) -> Result<Accumulation, RunAborted>
where
    S: AutomationSurface,
{
    let mut businesses = BusinessCollection::new();
    let mut processed = 0usize;
    let mut failed = 0usize;

    for (index, handle) in handles.iter().enumerate() {
        if budget.expired() {
            tracing::warn!(
                processed,
                remaining = handles.len() - index,
                "overall time limit reached; stopping processing"
            );
            return Ok(Accumulation {
                businesses,
                stop: AccumulationStop::BudgetExpired,
                failed,
            });
        }

        match resolver.resolve(index, handle, query).await {
            Ok(business) => {
                processed += 1;
                tracing::info!(
                    processed,
                    target = target_total,
                    name = %business.name,
                    address = %business.address,
                    rating = ?business.reviews_average,
                    reviews = ?business.reviews_count,
                    "listing extracted"
                );
                businesses.push(business);
            }
            Err(error) if error.is_session_failure() => {
                tracing::error!(index, processed, error = %error, "automation session lost");
                return Err(RunAborted {
                    error,
                    partial: businesses,
                });
            }
            Err(error) => {
                failed += 1;
                tracing::warn!(index, error = %error, "error while processing listing; skipping");
            }
        }
    }

    Ok(Accumulation {
        businesses,
        stop: AccumulationStop::Completed,
        failed,
    })
}

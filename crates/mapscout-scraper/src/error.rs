use mapscout_core::BusinessCollection;
use thiserror::Error;

/// Failure reported by an automation surface.
///
/// The split decides how far a failure travels: `Operation` errors cost at
/// most one listing, `Session` errors end the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The surface itself is unusable (transport down, session gone).
    #[error("automation session unusable: {0}")]
    Session(String),

    /// A single action failed; the surface is still usable.
    #[error("automation operation failed: {0}")]
    Operation(String),
}

impl SurfaceError {
    #[must_use]
    pub fn is_session(&self) -> bool {
        matches!(self, SurfaceError::Session(_))
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("listing #{index} could not be opened: {reason}")]
    OpenFailed { index: usize, reason: String },

    #[error("automation session failed: {0}")]
    SessionFailure(#[source] SurfaceError),

    #[error("search page setup failed while trying to {step}: {source}")]
    Setup {
        step: &'static str,
        #[source]
        source: SurfaceError,
    },
}

impl ScrapeError {
    #[must_use]
    pub fn is_session_failure(&self) -> bool {
        matches!(self, ScrapeError::SessionFailure(_))
    }
}

/// Splits a surface failure into "keep going" and "stop the run".
///
/// Returns the error back as `Ok` when it is a per-operation fault the
/// caller may recover from, and as `Err(SessionFailure)` otherwise.
pub(crate) fn recoverable(err: SurfaceError) -> Result<SurfaceError, ScrapeError> {
    if err.is_session() {
        Err(ScrapeError::SessionFailure(err))
    } else {
        Ok(err)
    }
}

/// Terminal run failure that still carries the records gathered before it.
#[derive(Debug, Error)]
#[error("scrape aborted after {} records: {error}", .partial.len())]
pub struct RunAborted {
    #[source]
    pub error: ScrapeError,
    pub partial: BusinessCollection,
}

impl RunAborted {
    #[must_use]
    pub fn empty(error: ScrapeError) -> Self {
        Self {
            error,
            partial: BusinessCollection::new(),
        }
    }
}

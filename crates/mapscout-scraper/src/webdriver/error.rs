use thiserror::Error;

/// Errors raised while establishing a WebDriver session.
///
/// Once a session exists, failures are reported per call as
/// [`crate::SurfaceError`] instead.
#[derive(Debug, Error)]
pub enum WebDriverError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid WebDriver URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The driver refused to start a browser.
    #[error("session not created: {0}")]
    SessionNotCreated(String),

    /// The driver answered with something that is not a WebDriver response.
    #[error("unexpected WebDriver response: {0}")]
    Protocol(String),
}

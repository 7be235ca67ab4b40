//! The automation-surface port.
//!
//! The engine never talks to a browser directly. It drives whatever
//! implements [`AutomationSurface`]: the WebDriver adapter in production,
//! a scripted fake in tests.

#[cfg(test)]
pub(crate) mod fake;
mod guard;

use std::fmt::Debug;
use std::future::Future;

pub use guard::SessionGuard;

use crate::error::SurfaceError;

/// Operations the scraper needs from a browser-like automation session.
///
/// Selectors are `XPath` expressions. All calls are issued one at a time by
/// a single task; implementations need no internal ordering guarantees
/// beyond that.
pub trait AutomationSurface: Send + Sync {
    /// Opaque reference to one element of the current page.
    type Element: Clone + Debug + Send + Sync;

    fn navigate(&self, url: &str) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    fn current_url(&self) -> impl Future<Output = Result<String, SurfaceError>> + Send;

    /// Replaces the content of the first element matching `selector`.
    fn fill(
        &self,
        selector: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Presses and releases a named key such as `"Enter"`.
    fn press_key(&self, key: &str) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    fn count(&self, selector: &str) -> impl Future<Output = Result<usize, SurfaceError>> + Send;

    /// All elements matching `selector`, in document order.
    fn find_all(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Self::Element>, SurfaceError>> + Send;

    /// Elements matching `selector` evaluated relative to `element`
    /// (`".."` yields the containing element).
    fn find_within(
        &self,
        element: &Self::Element,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Self::Element>, SurfaceError>> + Send;

    fn inner_text(
        &self,
        element: &Self::Element,
    ) -> impl Future<Output = Result<String, SurfaceError>> + Send;

    /// Attribute value, or `None` when the attribute is absent.
    fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, SurfaceError>> + Send;

    /// Mouse-wheel style incremental scroll.
    fn scroll(
        &self,
        delta_x: i64,
        delta_y: i64,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    fn click(&self, element: &Self::Element)
        -> impl Future<Output = Result<(), SurfaceError>> + Send;

    fn hover(&self, element: &Self::Element)
        -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Ends the session. Calling it more than once must be harmless.
    fn close(&self) -> impl Future<Output = Result<(), SurfaceError>> + Send;
}

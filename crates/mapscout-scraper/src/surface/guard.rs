use std::sync::Arc;

use tokio::runtime::Handle;

use super::AutomationSurface;
use crate::error::SurfaceError;

/// Owns an automation session and guarantees it gets closed.
///
/// Two cleanup paths:
/// 1. [`SessionGuard::close`], awaited on every normal exit.
/// 2. `Drop`, which spawns a background close when the guard is dropped
///    without an explicit close (panic, cancelled future).
pub struct SessionGuard<S>
where
    S: AutomationSurface + 'static,
{
    surface: Arc<S>,
    runtime: Option<Handle>,
    released: bool,
}

impl<S> SessionGuard<S>
where
    S: AutomationSurface + 'static,
{
    pub fn new(surface: S) -> Self {
        Self {
            surface: Arc::new(surface),
            runtime: Handle::try_current().ok(),
            released: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Close the session, consuming the guard.
    ///
    /// # Errors
    ///
    /// Returns the surface's close error. The session is considered released
    /// either way.
    pub async fn close(mut self) -> Result<(), SurfaceError> {
        self.released = true;
        let result = self.surface.close().await;
        match &result {
            Ok(()) => tracing::debug!("automation session closed"),
            Err(e) => tracing::warn!(error = %e, "failed to close automation session"),
        }
        result
    }
}

impl<S> Drop for SessionGuard<S>
where
    S: AutomationSurface + 'static,
{
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match self.runtime.take() {
            Some(runtime) => {
                let surface = Arc::clone(&self.surface);
                runtime.spawn(async move {
                    if let Err(e) = surface.close().await {
                        tracing::warn!(error = %e, "session guard drop cleanup failed");
                    }
                });
            }
            None => tracing::warn!("session guard dropped outside a runtime; session not closed"),
        }
    }
}

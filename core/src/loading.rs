//! Full-screen busy indicator shared by all requests.
//!
//! Acquisition is reference-counted: the indicator is shown when the first
//! request acquires it and hidden when the last guard is dropped, so
//! overlapping requests never hide it early. Release happens in `Drop`, which
//! covers success, error and cancelled futures alike.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

/// Something that can display and dismiss a busy overlay.
pub trait BusyIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Indicator that only reports through `tracing`.
#[derive(Debug, Default)]
pub struct TracingIndicator;

impl BusyIndicator for TracingIndicator {
    fn show(&self) {
        debug!("busy indicator shown");
    }

    fn hide(&self) {
        debug!("busy indicator hidden");
    }
}

#[derive(Clone)]
pub struct LoadingIndicator {
    inner: Arc<Inner>,
}

struct Inner {
    active: Mutex<usize>,
    indicator: Arc<dyn BusyIndicator>,
}

impl LoadingIndicator {
    pub fn new(indicator: Arc<dyn BusyIndicator>) -> Self {
        Self {
            inner: Arc::new(Inner {
                active: Mutex::new(0),
                indicator,
            }),
        }
    }

    /// Hold the indicator until the returned guard is dropped.
    pub fn acquire(&self) -> LoadingGuard {
        let mut active = self.inner.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active += 1;
        if *active == 1 {
            self.inner.indicator.show();
        }
        LoadingGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of requests currently holding the indicator.
    pub fn active(&self) -> usize {
        *self.inner.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self::new(Arc::new(TracingIndicator))
    }
}

impl std::fmt::Debug for LoadingIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingIndicator")
            .field("active", &self.active())
            .finish()
    }
}

#[must_use = "the indicator is released as soon as the guard is dropped"]
pub struct LoadingGuard {
    inner: Arc<Inner>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut active = self.inner.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active = active.saturating_sub(1);
        if *active == 0 {
            self.inner.indicator.hide();
        }
    }
}

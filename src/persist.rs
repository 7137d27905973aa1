//! Debounced persistence.
//!
//! There is no portable clock on wasm, so callers pass `now_ms` in
//! (`performance.now()` in the browser, a counter in tests).

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use crate::document::SavePayload;
use crate::error::PersistError;

/// Host-side storage for saved documents.
pub trait PersistSink {
    fn save(&mut self, payload: &SavePayload) -> Result<(), PersistError>;
}

impl<F> PersistSink for F
where
    F: FnMut(&SavePayload) -> Result<(), PersistError>,
{
    fn save(&mut self, payload: &SavePayload) -> Result<(), PersistError> {
        self(payload)
    }
}

/// Holds the most recent value until `window_ms` passes without a new one.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window_ms: f64,
    pending: Option<(T, f64)>,
}

impl<T> Debouncer<T> {
    pub fn new(window_ms: f64) -> Self {
        Debouncer { window_ms, pending: None }
    }

    /// Replace any pending value and restart the window.
    pub fn schedule(&mut self, value: T, now_ms: f64) {
        self.pending = Some((value, now_ms + self.window_ms));
    }

    /// Take the pending value if its window has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        let due = self.pending.as_ref().map(|(_, due)| *due)?;
        if now_ms < due {
            return None;
        }
        self.flush()
    }

    /// Take the pending value regardless of the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

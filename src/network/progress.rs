// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Byte-level progress forwarding

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::http::ProgressCallback;

/// Forwards `(bytes_transferred, total_expected)` to the registered handler.
///
/// One handler at a time; setting a new one replaces the old. Calls are
/// synchronous with no buffering.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    handler: Arc<RwLock<Option<ProgressCallback>>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active handler; `None` clears it
    pub fn set_handler(&self, handler: Option<ProgressCallback>) {
        *self.handler.write() = handler;
    }

    pub fn has_handler(&self) -> bool {
        self.handler.read().is_some()
    }

    /// Forward one progress update.
    ///
    /// A panicking handler is logged and contained; the transfer it reports
    /// on carries on.
    pub fn report(&self, transferred: u64, total: Option<u64>) {
        // Clone out of the lock so the handler may replace itself
        let handler = self.handler.read().clone();
        let Some(handler) = handler else {
            return;
        };

        if catch_unwind(AssertUnwindSafe(|| handler(transferred, total))).is_err() {
            tracing::error!(transferred, ?total, "Progress handler panicked");
        }
    }

    /// A transport-facing callback that forwards into this reporter
    pub fn as_callback(&self) -> ProgressCallback {
        let reporter = self.clone();
        Arc::new(move |transferred, total| reporter.report(transferred, total))
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn test_forwards_same_arguments() {
        let reporter = ProgressReporter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        reporter.set_handler(Some(Arc::new(move |done, total| s.lock().push((done, total)))));

        reporter.report(10, Some(100));
        reporter.report(100, None);

        assert_eq!(*seen.lock(), vec![(10, Some(100)), (100, None)]);
    }

    #[test]
    fn test_replacing_handler() {
        let reporter = ProgressReporter::new();
        let first = Arc::new(Mutex::new(0u32));
        let second = Arc::new(Mutex::new(0u32));

        let f = first.clone();
        reporter.set_handler(Some(Arc::new(move |_, _| *f.lock() += 1)));
        let s = second.clone();
        reporter.set_handler(Some(Arc::new(move |_, _| *s.lock() += 1)));

        reporter.as_callback()(1, Some(1));
        assert_eq!(*first.lock(), 0);
        assert_eq!(*second.lock(), 1);

        reporter.set_handler(None);
        reporter.report(2, Some(2));
        assert_eq!(*second.lock(), 1);
        assert!(!reporter.has_handler());
    }

    #[test]
    fn test_panicking_handler_is_contained() {
        let reporter = ProgressReporter::new();
        reporter.set_handler(Some(Arc::new(|_, _| panic!("progress handler failure"))));

        reporter.report(1, Some(2));
        reporter.report(2, Some(2));
        assert!(reporter.has_handler());
    }
}

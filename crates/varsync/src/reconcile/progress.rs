//! Progress reporting for reconciliation runs.

/// Progress events emitted while reconciling.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ReconcileProgress {
    /// Starting to fetch the remote variable set.
    FetchingVariables,

    /// Fetched one page of remote variables.
    FetchedPage {
        /// Page number (1-indexed).
        page: u32,
        /// Number of variables on this page.
        count: usize,
        /// Running total fetched so far.
        total_so_far: usize,
    },

    /// Finished fetching the remote variable set.
    FetchComplete {
        /// Total number of variables fetched.
        total: usize,
    },

    /// Starting to apply changes.
    ApplyingChanges {
        /// Number of variables with pending changes.
        count: usize,
        /// Whether this is a dry run.
        dry_run: bool,
    },

    /// Created a variable that had no remote counterpart.
    CreatedVariable {
        key: String,
        environment_scope: String,
    },

    /// Replaced a drifted variable (delete, then create).
    UpdatedVariable {
        key: String,
        environment_scope: String,
    },

    /// Deleted a variable.
    DeletedVariable {
        key: String,
        environment_scope: String,
    },

    /// Waiting out a rate limit before retrying a call.
    RateLimitBackoff {
        /// Key of the variable being applied.
        key: String,
        /// How long until the retry fires.
        retry_after_ms: u64,
        /// Attempt number.
        attempt: u32,
    },

    /// Reconciliation finished.
    Complete {
        added: usize,
        updated: usize,
        removed: usize,
        untouched: usize,
    },
}

/// Callback for receiving progress events.
pub type ProgressCallback = Box<dyn Fn(ReconcileProgress) + Send + Sync>;

/// Emit an event to an optional callback.
pub fn emit(on_progress: Option<&ProgressCallback>, event: ReconcileProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_calls_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_capture = Arc::clone(&calls);

        let callback: ProgressCallback = Box::new(move |event| {
            calls_capture.fetch_add(1, Ordering::SeqCst);
            if let ReconcileProgress::FetchComplete { total } = event {
                assert_eq!(total, 7);
            }
        });

        emit(Some(&callback), ReconcileProgress::FetchComplete { total: 7 });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_emit_without_callback_is_noop() {
        emit(None, ReconcileProgress::FetchingVariables);
    }
}

//! Progress reporting for reconciliation runs.

use varsync::ReconcileProgress;

/// Logging reporter using tracing for structured output.
pub(crate) struct LoggingReporter;

impl LoggingReporter {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn handle(&self, event: ReconcileProgress) {
        match event {
            ReconcileProgress::FetchingVariables => {
                tracing::info!("Fetching remote variables");
            }

            ReconcileProgress::FetchedPage {
                page,
                count,
                total_so_far,
            } => {
                tracing::debug!(page, count, total_so_far, "Fetched page");
            }

            ReconcileProgress::FetchComplete { total } => {
                tracing::info!(total, "Fetch complete");
            }

            ReconcileProgress::ApplyingChanges { count, dry_run } => {
                tracing::info!(count, dry_run, "Applying changes");
            }

            ReconcileProgress::CreatedVariable {
                key,
                environment_scope,
            } => {
                tracing::info!(key = %key, scope = %environment_scope, "Created variable");
            }

            ReconcileProgress::UpdatedVariable {
                key,
                environment_scope,
            } => {
                tracing::info!(key = %key, scope = %environment_scope, "Updated variable");
            }

            ReconcileProgress::DeletedVariable {
                key,
                environment_scope,
            } => {
                tracing::info!(key = %key, scope = %environment_scope, "Deleted variable");
            }

            ReconcileProgress::RateLimitBackoff {
                key,
                retry_after_ms,
                attempt,
            } => {
                tracing::warn!(key = %key, retry_after_ms, attempt, "Rate limited, backing off");
            }

            ReconcileProgress::Complete {
                added,
                updated,
                removed,
                untouched,
            } => {
                tracing::info!(added, updated, removed, untouched, "Reconciliation complete");
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_handles_all_event_shapes() {
        let reporter = LoggingReporter::new();

        reporter.handle(ReconcileProgress::FetchingVariables);
        reporter.handle(ReconcileProgress::FetchedPage {
            page: 1,
            count: 100,
            total_so_far: 100,
        });
        reporter.handle(ReconcileProgress::FetchComplete { total: 100 });
        reporter.handle(ReconcileProgress::ApplyingChanges {
            count: 3,
            dry_run: false,
        });
        reporter.handle(ReconcileProgress::CreatedVariable {
            key: "FOO".to_string(),
            environment_scope: "*".to_string(),
        });
        reporter.handle(ReconcileProgress::Complete {
            added: 1,
            updated: 0,
            removed: 0,
            untouched: 2,
        });
    }
}

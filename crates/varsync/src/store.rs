//! Storage abstraction over the remote variable set.

use async_trait::async_trait;

use crate::gitlab::ApiError;
use crate::reconcile::ProgressCallback;
use crate::variable::Variable;

/// The three primitives every reconciliation pass is built from.
///
/// The remote API has no atomic edit: callers that need to change an
/// existing variable delete it and recreate it, accepting a window in which
/// the variable is absent.
#[async_trait]
pub trait VariableStore: Send + Sync {
    /// Fetch the full remote variable set.
    async fn list_variables(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Variable>, ApiError>;

    /// Create a variable that does not exist yet.
    async fn create_variable(
        &self,
        var: &Variable,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<(), ApiError>;

    /// Delete the variable identified by `key` within `environment_scope`.
    async fn delete_variable(
        &self,
        key: &str,
        environment_scope: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<(), ApiError>;
}

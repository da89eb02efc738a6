//! Options and outcome types for reconciliation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gitlab::ApiError;
use crate::variable::Variable;

/// Target state for the declared variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Declared variables should exist with the declared attributes.
    #[default]
    Present,
    /// Declared variables should not exist.
    Absent,
}

impl State {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            State::Present => "present",
            State::Absent => "absent",
        }
    }
}

/// Options for a reconciliation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Target state for the declared variables.
    pub state: State,
    /// Delete remote variables the declaration does not cover. With state
    /// absent, deletes every remote variable.
    pub purge: bool,
    /// Compute the outcome without issuing any mutating call.
    pub dry_run: bool,
}

/// Categorized result of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Outcome {
    /// Variables created because no (key, scope) match existed.
    pub added: Vec<Variable>,
    /// Variables replaced because their attributes had drifted.
    pub updated: Vec<Variable>,
    /// Variables deleted.
    pub removed: Vec<Variable>,
    /// Variables left exactly as they were.
    pub untouched: Vec<Variable>,
}

impl Outcome {
    /// True when the pass mutated (or, dry-run, would mutate) the remote set.
    #[must_use]
    pub fn changed(&self) -> bool {
        !(self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty())
    }

    #[must_use]
    pub fn added_keys(&self) -> Vec<String> {
        keys(&self.added)
    }

    #[must_use]
    pub fn updated_keys(&self) -> Vec<String> {
        keys(&self.updated)
    }

    #[must_use]
    pub fn removed_keys(&self) -> Vec<String> {
        keys(&self.removed)
    }

    #[must_use]
    pub fn untouched_keys(&self) -> Vec<String> {
        keys(&self.untouched)
    }
}

fn keys(vars: &[Variable]) -> Vec<String> {
    vars.iter().map(|v| v.key.clone()).collect()
}

/// Errors from a reconciliation pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Invalid declaration, reported before any API call.
    #[error("validation error: {0}")]
    Validation(String),

    /// An underlying API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

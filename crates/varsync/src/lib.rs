//! varsync - declarative reconciliation of GitLab instance-level CI/CD
//! variables.
//!
//! A desired variable set is declared per invocation; the remote GitLab
//! instance is the only persistent state. One reconciliation pass lists the
//! remote set, computes the difference, and issues the create/delete calls
//! needed to converge, reporting a categorized outcome
//! (added/updated/removed/untouched).
//!
//! # Example
//!
//! ```ignore
//! use varsync::{InstanceVariablesClient, RawVariable, ReconcileOptions, normalize, reconcile};
//!
//! let client = InstanceVariablesClient::new("gitlab.example.com", "token")?;
//! let desired = normalize(&[RawVariable::pair("ACCESS_KEY_ID", "abc1312cba")], Default::default())?;
//!
//! let outcome = reconcile(&client, &desired, &ReconcileOptions::default(), None).await?;
//! println!("added: {:?}", outcome.added_keys());
//! ```

pub mod gitlab;
pub mod http;
pub mod reconcile;
pub mod retry;
pub mod store;
pub mod variable;

pub use gitlab::{ApiError, InstanceVariablesClient};
pub use reconcile::{
    Outcome, ProgressCallback, ReconcileError, ReconcileOptions, ReconcileProgress, State,
    normalize, plan, reconcile,
};
pub use store::VariableStore;
pub use variable::{RawVariable, Variable, VariableType};

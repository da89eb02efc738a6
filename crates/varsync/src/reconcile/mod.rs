//! Declarative reconciliation of the remote variable set.
//!
//! # Module Structure
//!
//! - [`types`] - `State`, `ReconcileOptions`, `Outcome`, `ReconcileError`
//! - [`progress`] - Progress reporting: `ReconcileProgress`, `ProgressCallback`, `emit()`
//! - [`engine`] - The pass itself: `normalize()`, `plan()`, `reconcile()`
//!
//! # Example
//!
//! ```ignore
//! use varsync::reconcile::{ReconcileOptions, reconcile};
//!
//! let outcome = reconcile(&client, &desired, &ReconcileOptions::default(), None).await?;
//! if outcome.changed() {
//!     println!("added: {:?}", outcome.added_keys());
//! }
//! ```

pub mod engine;
mod progress;
mod types;

pub use engine::{normalize, plan, reconcile};
pub use progress::{ProgressCallback, ReconcileProgress, emit};
pub use types::{Outcome, ReconcileError, ReconcileOptions, State};

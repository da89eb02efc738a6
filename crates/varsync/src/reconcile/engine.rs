//! The reconciliation pass.
//!
//! One pass fetches the remote variable set, computes the difference against
//! the declared set, applies creates/updates/deletes, and reports a
//! categorized outcome. Dry runs compute the same categories from the
//! comparison alone, without issuing any mutating call.

use std::collections::HashSet;

use super::progress::{ProgressCallback, ReconcileProgress, emit};
use super::types::{Outcome, ReconcileError, ReconcileOptions, State};
use crate::gitlab::is_duplicate_key_error;
use crate::store::VariableStore;
use crate::variable::{DEFAULT_SCOPE, RawVariable, Variable};

/// Fill defaults and coerce declared variables into their canonical form.
///
/// With state present, a declaration without a value is rejected here,
/// before any network traffic. With state absent the value is irrelevant to
/// deletion matching and defaults to empty.
pub fn normalize(declared: &[RawVariable], state: State) -> Result<Vec<Variable>, ReconcileError> {
    let mut variables = Vec::with_capacity(declared.len());

    for raw in declared {
        let value = match (&raw.value, state) {
            (Some(value), _) => value.clone(),
            (None, State::Absent) => String::new(),
            (None, State::Present) => {
                return Err(ReconcileError::Validation(format!(
                    "variable '{}' has no value; a value is required when state is present",
                    raw.name
                )));
            }
        };

        variables.push(Variable {
            key: raw.name.clone(),
            value,
            masked: raw.masked.unwrap_or(false),
            protected: raw.protected.unwrap_or(false),
            environment_scope: raw
                .environment_scope
                .clone()
                .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            variable_type: raw.variable_type.unwrap_or_default(),
        });
    }

    Ok(variables)
}

/// Run one reconciliation pass.
///
/// The remote set is listed once up front; with `dry_run` the outcome is
/// derived purely from that snapshot. A real pass applies the changes and
/// re-lists to compute the untouched set from the before/after snapshots.
pub async fn reconcile<S: VariableStore>(
    store: &S,
    desired: &[Variable],
    options: &ReconcileOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<Outcome, ReconcileError> {
    let before = store.list_variables(on_progress).await?;

    let outcome = if options.dry_run {
        plan(desired, &before, options)
    } else {
        match options.state {
            State::Present => apply_present(store, desired, &before, options, on_progress).await?,
            State::Absent => apply_absent(store, desired, &before, options, on_progress).await?,
        }
    };

    emit(
        on_progress,
        ReconcileProgress::Complete {
            added: outcome.added.len(),
            updated: outcome.updated.len(),
            removed: outcome.removed.len(),
            untouched: outcome.untouched.len(),
        },
    );

    Ok(outcome)
}

/// Compute the outcome of a pass without issuing any mutating call.
///
/// Full attribute equality means untouched; a (key, scope) match with
/// differing attributes means updated; no match means added. Removed holds
/// whatever the purge/absent rule would delete, computed by membership.
pub fn plan(desired: &[Variable], remote: &[Variable], options: &ReconcileOptions) -> Outcome {
    let mut outcome = Outcome::default();
    let desired_idents: HashSet<(&str, &str)> = desired.iter().map(Variable::ident).collect();

    match options.state {
        State::Present => {
            let remote_idents: HashSet<(&str, &str)> =
                remote.iter().map(Variable::ident).collect();

            for var in desired {
                if remote.contains(var) {
                    outcome.untouched.push(var.clone());
                } else if remote_idents.contains(&var.ident()) {
                    outcome.updated.push(var.clone());
                } else {
                    outcome.added.push(var.clone());
                }
            }

            if options.purge {
                outcome.removed = remote
                    .iter()
                    .filter(|var| !desired_idents.contains(&var.ident()))
                    .cloned()
                    .collect();
            }
        }
        State::Absent => {
            outcome.removed = if options.purge {
                remote.to_vec()
            } else {
                remote
                    .iter()
                    .filter(|var| desired_idents.contains(&var.ident()))
                    .cloned()
                    .collect()
            };
        }
    }

    outcome
}

async fn apply_present<S: VariableStore>(
    store: &S,
    desired: &[Variable],
    before: &[Variable],
    options: &ReconcileOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<Outcome, ReconcileError> {
    let mut outcome = Outcome::default();

    // Anything equal to a remote variable in every attribute needs no call.
    let to_apply: Vec<&Variable> = desired
        .iter()
        .filter(|var| !before.contains(*var))
        .collect();

    emit(
        on_progress,
        ReconcileProgress::ApplyingChanges {
            count: to_apply.len(),
            dry_run: false,
        },
    );

    for var in to_apply {
        match store.create_variable(var, on_progress).await {
            Ok(()) => {
                outcome.added.push(var.clone());
                emit(
                    on_progress,
                    ReconcileProgress::CreatedVariable {
                        key: var.key.clone(),
                        environment_scope: var.environment_scope.clone(),
                    },
                );
            }
            Err(err) if is_duplicate_key_error(&err) => {
                // The (key, scope) pair exists with drifted attributes.
                // There is no atomic edit, so replace it: the variable is
                // briefly absent between the two calls.
                store
                    .delete_variable(&var.key, &var.environment_scope, on_progress)
                    .await?;
                store.create_variable(var, on_progress).await?;
                outcome.updated.push(var.clone());
                emit(
                    on_progress,
                    ReconcileProgress::UpdatedVariable {
                        key: var.key.clone(),
                        environment_scope: var.environment_scope.clone(),
                    },
                );
            }
            Err(err) => return Err(err.into()),
        }
    }

    if options.purge {
        let desired_idents: HashSet<(&str, &str)> =
            desired.iter().map(Variable::ident).collect();
        let existing = store.list_variables(None).await?;
        let stale: Vec<Variable> = existing
            .into_iter()
            .filter(|var| !desired_idents.contains(&var.ident()))
            .collect();

        for var in stale {
            store
                .delete_variable(&var.key, &var.environment_scope, on_progress)
                .await?;
            emit(
                on_progress,
                ReconcileProgress::DeletedVariable {
                    key: var.key.clone(),
                    environment_scope: var.environment_scope.clone(),
                },
            );
            outcome.removed.push(var);
        }
    }

    let after = store.list_variables(None).await?;
    outcome.untouched = before
        .iter()
        .filter(|var| after.contains(*var))
        .cloned()
        .collect();

    Ok(outcome)
}

async fn apply_absent<S: VariableStore>(
    store: &S,
    desired: &[Variable],
    before: &[Variable],
    options: &ReconcileOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<Outcome, ReconcileError> {
    let mut outcome = Outcome::default();
    let desired_idents: HashSet<(&str, &str)> = desired.iter().map(Variable::ident).collect();

    // Key and scope suffice for deletion matching; value and type do not
    // participate.
    let targets: Vec<Variable> = if options.purge {
        before.to_vec()
    } else {
        before
            .iter()
            .filter(|var| desired_idents.contains(&var.ident()))
            .cloned()
            .collect()
    };

    emit(
        on_progress,
        ReconcileProgress::ApplyingChanges {
            count: targets.len(),
            dry_run: false,
        },
    );

    for var in targets {
        store
            .delete_variable(&var.key, &var.environment_scope, on_progress)
            .await?;
        emit(
            on_progress,
            ReconcileProgress::DeletedVariable {
                key: var.key.clone(),
                environment_scope: var.environment_scope.clone(),
            },
        );
        outcome.removed.push(var);
    }

    let after = store.list_variables(None).await?;
    outcome.untouched = before
        .iter()
        .filter(|var| after.contains(*var))
        .cloned()
        .collect();

    Ok(outcome)
}

//! Wire types for the instance-variables endpoints.

use serde::{Deserialize, Serialize};

use crate::variable::{DEFAULT_SCOPE, Variable, VariableType};

/// A variable as returned by `GET /admin/ci/variables`.
///
/// Older servers omit `environment_scope` from the payload; it defaults to
/// the wildcard scope so comparisons stay well-defined.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub masked: bool,
    #[serde(default)]
    pub protected: bool,
    #[serde(default = "default_scope")]
    pub environment_scope: String,
    #[serde(default)]
    pub variable_type: VariableType,
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

impl From<RemoteVariable> for Variable {
    fn from(remote: RemoteVariable) -> Self {
        Self {
            key: remote.key,
            value: remote.value,
            masked: remote.masked,
            protected: remote.protected,
            environment_scope: remote.environment_scope,
            variable_type: remote.variable_type,
        }
    }
}

/// Request body for `POST /admin/ci/variables`.
#[derive(Debug, Serialize)]
pub struct CreateVariableRequest<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub masked: bool,
    pub protected: bool,
    pub variable_type: VariableType,
    pub environment_scope: &'a str,
}

impl<'a> From<&'a Variable> for CreateVariableRequest<'a> {
    fn from(var: &'a Variable) -> Self {
        Self {
            key: &var.key,
            value: &var.value,
            masked: var.masked,
            protected: var.protected,
            variable_type: var.variable_type,
            environment_scope: &var.environment_scope,
        }
    }
}

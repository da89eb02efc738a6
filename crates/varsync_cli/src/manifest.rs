//! Manifest file describing the declared variable set.
//!
//! Two forms are supported and are mutually exclusive:
//!
//! ```toml
//! # Canonical form: full control over every attribute.
//! [[variables]]
//! name = "ACCESS_KEY_ID"
//! value = "abc1312cba"
//!
//! [[variables]]
//! name = "SECRET_ACCESS_KEY"
//! value = "czEzMzdwYXNz"
//! masked = true
//! protected = true
//! variable_type = "env_var"
//! ```
//!
//! ```toml
//! # Simple form: plain name/value pairs, everything else defaulted.
//! [vars]
//! ACCESS_KEY_ID = "abc1312cba"
//! BUILD_NUMBER = 42
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use varsync::{RawVariable, VariableType};

#[derive(Debug, Error)]
pub(crate) enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("'vars' and 'variables' are mutually exclusive; declare one of them")]
    Conflict,
}

/// A manifest value: strings, numbers, and booleans are all accepted and
/// coerced to their string form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ManifestValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl ManifestValue {
    fn into_string(self) -> String {
        match self {
            ManifestValue::String(s) => s,
            ManifestValue::Integer(n) => n.to_string(),
            ManifestValue::Float(f) => f.to_string(),
            ManifestValue::Boolean(b) => b.to_string(),
        }
    }
}

/// One declared variable in the canonical `variables` list.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ManifestVariable {
    pub name: String,
    #[serde(default)]
    pub value: Option<ManifestValue>,
    #[serde(default)]
    pub masked: Option<bool>,
    #[serde(default)]
    pub protected: Option<bool>,
    #[serde(default)]
    pub environment_scope: Option<String>,
    #[serde(default)]
    pub variable_type: Option<VariableType>,
}

/// The manifest: a `variables` list, or a simple `vars` name/value table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Manifest {
    pub vars: BTreeMap<String, ManifestValue>,
    pub variables: Vec<ManifestVariable>,
}

impl Manifest {
    /// Load a manifest from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Convert into the library's declaration form.
    pub(crate) fn into_raw_variables(self) -> Result<Vec<RawVariable>, ManifestError> {
        if !self.vars.is_empty() && !self.variables.is_empty() {
            return Err(ManifestError::Conflict);
        }

        if !self.vars.is_empty() {
            return Ok(self
                .vars
                .into_iter()
                .map(|(name, value)| RawVariable::pair(name, value.into_string()))
                .collect());
        }

        Ok(self
            .variables
            .into_iter()
            .map(|var| RawVariable {
                name: var.name,
                value: var.value.map(ManifestValue::into_string),
                masked: var.masked,
                protected: var.protected,
                environment_scope: var.environment_scope,
                variable_type: var.variable_type,
            })
            .collect())
    }
}

//! Core variable model.

use serde::{Deserialize, Serialize};

/// The default environment scope: applies to every environment.
pub const DEFAULT_SCOPE: &str = "*";

/// Whether a variable is injected into the job environment or materialized
/// as a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    /// Exported as an environment variable (wire name `env_var`).
    #[default]
    EnvVar,
    /// Written to a temporary file whose path is exported (wire name `file`).
    File,
}

impl VariableType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VariableType::EnvVar => "env_var",
            VariableType::File => "file",
        }
    }
}

/// An instance-level CI/CD variable.
///
/// Two variables refer to the same remote entity when their
/// (`key`, `environment_scope`) pairs match; they count as unchanged only
/// when every attribute is equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name, unique within an environment scope.
    pub key: String,
    /// Variable value.
    pub value: String,
    /// Whether the value is hidden from job logs.
    #[serde(default)]
    pub masked: bool,
    /// Whether the variable is only exposed to protected branches/tags.
    #[serde(default)]
    pub protected: bool,
    /// Wildcard or named filter restricting where the variable applies.
    #[serde(default = "default_scope")]
    pub environment_scope: String,
    /// Environment variable or file.
    #[serde(default)]
    pub variable_type: VariableType,
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

impl Variable {
    /// Identity for cross-set matching: the (key, scope) pair.
    #[must_use]
    pub fn ident(&self) -> (&str, &str) {
        (self.key.as_str(), self.environment_scope.as_str())
    }

    /// Whether `other` names the same remote entity.
    #[must_use]
    pub fn same_entity(&self, other: &Variable) -> bool {
        self.ident() == other.ident()
    }
}

/// A declared variable before defaults are filled in.
///
/// This is the shape a manifest or caller provides; `normalize` turns it
/// into a [`Variable`] with every attribute populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawVariable {
    /// The variable name.
    pub name: String,
    /// The variable value. Required when the target state is present.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub masked: Option<bool>,
    #[serde(default)]
    pub protected: Option<bool>,
    #[serde(default)]
    pub environment_scope: Option<String>,
    #[serde(default)]
    pub variable_type: Option<VariableType>,
}

impl RawVariable {
    /// Shorthand for a plain key/value declaration.
    #[must_use]
    pub fn pair(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(key: &str, value: &str, scope: &str) -> Variable {
        Variable {
            key: key.to_string(),
            value: value.to_string(),
            masked: false,
            protected: false,
            environment_scope: scope.to_string(),
            variable_type: VariableType::EnvVar,
        }
    }

    #[test]
    fn test_variable_type_wire_names() {
        assert_eq!(VariableType::EnvVar.as_str(), "env_var");
        assert_eq!(VariableType::File.as_str(), "file");

        let json = serde_json::to_string(&VariableType::EnvVar).unwrap();
        assert_eq!(json, r#""env_var""#);
        let parsed: VariableType = serde_json::from_str(r#""file""#).unwrap();
        assert_eq!(parsed, VariableType::File);
    }

    #[test]
    fn test_variable_deserialize_minimal() {
        let json = r#"{
            "key": "ACCESS_KEY_ID",
            "value": "abc1312cba"
        }"#;

        let var: Variable = serde_json::from_str(json).unwrap();
        assert_eq!(var.key, "ACCESS_KEY_ID");
        assert_eq!(var.value, "abc1312cba");
        assert!(!var.masked);
        assert!(!var.protected);
        assert_eq!(var.environment_scope, "*");
        assert_eq!(var.variable_type, VariableType::EnvVar);
    }

    #[test]
    fn test_variable_deserialize_full() {
        let json = r#"{
            "key": "SECRET_ACCESS_KEY",
            "value": "czEzMzdwYXNz",
            "masked": true,
            "protected": true,
            "environment_scope": "production",
            "variable_type": "file"
        }"#;

        let var: Variable = serde_json::from_str(json).unwrap();
        assert!(var.masked);
        assert!(var.protected);
        assert_eq!(var.environment_scope, "production");
        assert_eq!(var.variable_type, VariableType::File);
    }

    #[test]
    fn test_ident_is_key_and_scope() {
        let var = variable("FOO", "1", "production");
        assert_eq!(var.ident(), ("FOO", "production"));
    }

    #[test]
    fn test_same_entity_ignores_other_attributes() {
        let a = variable("FOO", "1", "*");
        let mut b = variable("FOO", "2", "*");
        b.masked = true;
        b.variable_type = VariableType::File;

        assert!(a.same_entity(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_entity_distinguishes_scope() {
        let a = variable("FOO", "1", "*");
        let b = variable("FOO", "1", "production");
        assert!(!a.same_entity(&b));
    }

    #[test]
    fn test_raw_variable_pair() {
        let raw = RawVariable::pair("FOO", "bar");
        assert_eq!(raw.name, "FOO");
        assert_eq!(raw.value, Some("bar".to_string()));
        assert!(raw.masked.is_none());
        assert!(raw.protected.is_none());
        assert!(raw.environment_scope.is_none());
        assert!(raw.variable_type.is_none());
    }
}

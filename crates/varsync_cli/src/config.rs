//! Configuration file support for varsync.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `VARSYNC_`, e.g., `VARSYNC_GITLAB_TOKEN`)
//! 3. Config file (~/.config/varsync/config.toml or ./varsync.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [gitlab]
//! host = "gitlab.com"  # or self-hosted instance
//! token = "glpat-..."  # or use VARSYNC_GITLAB_TOKEN env var
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// GitLab connection settings.
    pub gitlab: GitLabConfig,
}

/// GitLab configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct GitLabConfig {
    /// GitLab host (e.g., "gitlab.com" or "https://gitlab.example.com").
    /// Can also be set via VARSYNC_GITLAB_HOST environment variable.
    pub host: Option<String>,
    /// GitLab API token (personal access token with admin access).
    /// Can also be set via VARSYNC_GITLAB_TOKEN environment variable.
    pub token: Option<String>,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            host: Some("gitlab.com".to_string()),
            token: None,
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// Later sources override earlier ones: built-in defaults, then each
    /// candidate config file (XDG, then `./varsync.toml`), then `VARSYNC_`
    /// environment variables (`VARSYNC_GITLAB_TOKEN` -> `gitlab.token`).
    /// A broken config is reported and replaced with the defaults rather
    /// than aborting, since the token can still arrive via the environment.
    pub(crate) fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        for path in Self::candidate_files() {
            builder =
                builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("VARSYNC")
                .separator("_")
                .try_parsing(true),
        );

        match builder
            .build()
            .and_then(|settings| settings.try_deserialize::<Config>())
        {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Falling back to default configuration: {}", e);
                Config::default()
            }
        }
    }

    /// Config file locations, lowest precedence first. Missing files are
    /// skipped by the loader.
    fn candidate_files() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(proj_dirs) = ProjectDirs::from("", "", "varsync") {
            paths.push(proj_dirs.config_dir().join("config.toml"));
        }
        paths.push(PathBuf::from("varsync.toml"));
        paths
    }

    /// Get the GitLab host.
    pub(crate) fn gitlab_host(&self) -> String {
        self.gitlab
            .host
            .clone()
            .unwrap_or_else(|| "gitlab.com".to_string())
    }

    /// Get the GitLab token.
    pub(crate) fn gitlab_token(&self) -> Option<String> {
        self.gitlab.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gitlab.host, Some("gitlab.com".to_string()));
        assert!(config.gitlab.token.is_none());
    }

    #[test]
    fn test_gitlab_host_default() {
        let config = Config::default();
        assert_eq!(config.gitlab_host(), "gitlab.com");
    }

    #[test]
    fn test_candidate_files_end_with_local_override() {
        let paths = Config::candidate_files();
        assert!(!paths.is_empty());
        assert_eq!(paths.last(), Some(&PathBuf::from("varsync.toml")));
    }

    #[test]
    fn test_config_builder_with_toml_string() {
        let toml_content = r#"
            [gitlab]
            host = "gitlab.example.com"
            token = "glpat-test123"
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.gitlab_host(), "gitlab.example.com");
        assert_eq!(config.gitlab_token(), Some("glpat-test123".to_string()));
    }

    #[test]
    fn test_config_merging_order() {
        let base_toml = r#"
            [gitlab]
            host = "gitlab.com"
            token = "base-token"
        "#;

        let override_toml = r#"
            [gitlab]
            token = "override-token"
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(base_toml, FileFormat::Toml))
            .add_source(config::File::from_str(override_toml, FileFormat::Toml))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.gitlab_token(), Some("override-token".to_string()));
        assert_eq!(config.gitlab_host(), "gitlab.com");
    }

    #[test]
    fn test_config_unknown_fields_ignored() {
        let toml_content = r#"
            [gitlab]
            host = "gitlab.com"
            unknown_field = "should be ignored"
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();
        assert_eq!(config.gitlab_host(), "gitlab.com");
    }

    #[test]
    fn test_config_invalid_toml() {
        let invalid_toml = r#"
            [gitlab
            host = "gitlab.com"
        "#;

        let result = ConfigBuilder::builder()
            .add_source(config::File::from_str(invalid_toml, FileFormat::Toml))
            .build();

        assert!(result.is_err());
    }
}

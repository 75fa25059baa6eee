// cwprune-config - Layered configuration for the log group pruner
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from CWPRUNE_CONFIG env var
// 3. Config file contents from CWPRUNE_CONFIG_CONTENT env var
// 4. Default config file locations (./cwprune.toml, ./.cwprune.toml)
// 5. Built-in defaults (lowest priority)
//
// CLI flags are layered on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, ENV_PREFIX};

/// Default name substring: log groups created for Lambda functions.
pub const DEFAULT_FILTER_PATTERN: &str = "aws/lambda";

/// Main pruner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrunerConfig {
    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub log: LogConfig,

    /// What to do when a delete fails with an unrecognized error
    #[serde(default)]
    pub on_unknown_error: UnknownErrorPolicy,

    /// List and report only; never prompt or delete
    #[serde(default)]
    pub dry_run: bool,
}

/// Log group name filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Substring a log group name must contain to be considered
    pub pattern: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_FILTER_PATTERN.to_string(),
        }
    }
}

/// AWS client settings. Anything left unset is resolved by the SDK's own
/// region and credential provider chains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Named profile from the shared config/credentials files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Custom endpoint URL (e.g. LocalStack)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

/// Retry behavior for deletes rejected with "service unavailable"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the initial attempt
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 5_000,
            jitter: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

/// Policy for delete errors outside the known provider error kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownErrorPolicy {
    /// Stop the whole run with an error
    #[default]
    Abort,
    /// Log the error and continue with the next log group
    Skip,
}

impl std::fmt::Display for UnknownErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownErrorPolicy::Abort => write!(f, "abort"),
            UnknownErrorPolicy::Skip => write!(f, "skip"),
        }
    }
}

impl std::str::FromStr for UnknownErrorPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "abort" | "fail" => Ok(UnknownErrorPolicy::Abort),
            "skip" | "continue" => Ok(UnknownErrorPolicy::Skip),
            _ => anyhow::bail!("Unsupported unknown-error policy: {}. Supported: abort, skip", s),
        }
    }
}

impl PrunerConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration from a specific file path (for CLI usage).
    /// The result is not validated; callers validate after their own overrides.
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Load configuration, falling back to defaults when no config file exists.
    /// A config file that exists but cannot be read or parsed is an error.
    /// The result is not validated; callers validate after their own overrides.
    pub fn load_or_default() -> Result<Self> {
        sources::load_or_default()
    }

    /// Parse a TOML document into a config (no env overrides, no validation).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    /// Merge another config into this one (used for TOML layering).
    pub fn merge(&mut self, other: PrunerConfig) {
        self.filter = other.filter;
        self.retry = other.retry;
        self.log = other.log;
        self.on_unknown_error = other.on_unknown_error;
        self.dry_run = other.dry_run;

        if other.aws.region.is_some() {
            self.aws.region = other.aws.region;
        }
        if other.aws.profile.is_some() {
            self.aws.profile = other.aws.profile;
        }
        if other.aws.endpoint_url.is_some() {
            self.aws.endpoint_url = other.aws.endpoint_url;
        }
    }

    /// Apply environment overrides from a custom source.
    pub fn apply_env_overrides_from<E: EnvSource>(&mut self, env: &E) -> Result<()> {
        env_overrides::apply_env_overrides(self, env)
    }

    /// Build a configuration from inline TOML plus overrides supplied by an
    /// `EnvSource`, without touching the host environment or filesystem.
    pub fn load_with_env<E: EnvSource>(inline_config: Option<&str>, env: &E) -> Result<Self> {
        let mut config = PrunerConfig::default();

        if let Some(inline) = inline_config {
            let file_config: PrunerConfig =
                toml::from_str(inline).context("Failed to parse inline config content")?;
            config.merge(file_config);
        }

        config.apply_env_overrides_from(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvSource for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    #[test]
    fn test_defaults() {
        let config = PrunerConfig::default();
        assert_eq!(config.filter.pattern, "aws/lambda");
        assert_eq!(config.retry.max_retries, 3);
        assert!(config.retry.jitter);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Text);
        assert_eq!(config.on_unknown_error, UnknownErrorPolicy::Abort);
        assert!(!config.dry_run);
        assert!(config.aws.region.is_none());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_unknown_error_policy_from_str() {
        assert_eq!(
            "skip".parse::<UnknownErrorPolicy>().unwrap(),
            UnknownErrorPolicy::Skip
        );
        assert_eq!(
            "Abort".parse::<UnknownErrorPolicy>().unwrap(),
            UnknownErrorPolicy::Abort
        );
        assert!("ignore".parse::<UnknownErrorPolicy>().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_section_defaults() {
        let config = PrunerConfig::from_toml_str(
            r#"
            on_unknown_error = "skip"

            [filter]
            pattern = "/ecs/"

            [aws]
            region = "eu-west-1"
            "#,
        )
        .unwrap();

        assert_eq!(config.filter.pattern, "/ecs/");
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.on_unknown_error, UnknownErrorPolicy::Skip);
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_tables_with_some_fields_keep_field_defaults() {
        let config = PrunerConfig::from_toml_str("[retry]\nmax_retries = 5").unwrap();
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_backoff_ms, 200);
        assert_eq!(config.retry.max_backoff_ms, 5_000);
        assert!(config.retry.jitter);

        let config = PrunerConfig::from_toml_str("[log]\nformat = \"json\"").unwrap();
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "info");

        let config = PrunerConfig::from_toml_str("[filter]").unwrap();
        assert_eq!(config.filter.pattern, DEFAULT_FILTER_PATTERN);
    }

    #[test]
    fn test_merge_keeps_unset_aws_fields() {
        let mut base = PrunerConfig::default();
        base.aws.profile = Some("dev".to_string());

        let mut other = PrunerConfig::default();
        other.aws.region = Some("us-east-2".to_string());
        base.merge(other);

        assert_eq!(base.aws.profile.as_deref(), Some("dev"));
        assert_eq!(base.aws.region.as_deref(), Some("us-east-2"));
    }

    #[test]
    fn test_load_with_env_layers_env_over_inline() {
        let env = MapEnv(HashMap::from([("FILTER", "/aws/ecs"), ("MAX_RETRIES", "5")]));
        let config = PrunerConfig::load_with_env(
            Some(
                r#"
                [filter]
                pattern = "/aws/lambda"

                [retry]
                max_retries = 1
                initial_backoff_ms = 10
                max_backoff_ms = 100
                "#,
            ),
            &env,
        )
        .unwrap();

        assert_eq!(config.filter.pattern, "/aws/ecs");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_backoff_ms, 10);
    }

    #[test]
    fn test_load_with_env_rejects_invalid_result() {
        let env = MapEnv(HashMap::from([("FILTER", "")]));
        assert!(PrunerConfig::load_with_env(None, &env).is_err());
    }
}

// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &PrunerConfig) -> Result<()> {
    validate_filter_config(&config.filter)?;
    validate_aws_config(&config.aws)?;
    validate_retry_config(&config.retry)?;
    validate_log_config(&config.log)?;

    Ok(())
}

fn validate_filter_config(config: &FilterConfig) -> Result<()> {
    if config.pattern.is_empty() {
        bail!(
            "filter.pattern must not be empty\n\n\
            How to fix:\n\
              • CLI: --filter aws/lambda\n\
              • Environment: export {}FILTER=aws/lambda\n\
              • TOML: [filter]\n              pattern = \"aws/lambda\"",
            ENV_PREFIX
        );
    }

    // A lone separator matches every hierarchical name
    if config.pattern == "/" {
        warn!(
            pattern = %config.pattern,
            "filter.pattern matches almost every log group"
        );
    }

    Ok(())
}

fn validate_aws_config(config: &AwsConfig) -> Result<()> {
    if let Some(endpoint) = &config.endpoint_url {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            bail!(
                "aws.endpoint_url must start with http:// or https:// (got '{}')",
                endpoint
            );
        }
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<()> {
    if config.initial_backoff_ms > config.max_backoff_ms {
        bail!(
            "retry.initial_backoff_ms ({}) must not exceed retry.max_backoff_ms ({})",
            config.initial_backoff_ms,
            config.max_backoff_ms
        );
    }

    if config.max_retries > 10 {
        warn!(
            max_retries = config.max_retries,
            "retry.max_retries is very large; an unavailable service will stall the run"
        );
    }

    Ok(())
}

fn validate_log_config(config: &LogConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        bail!("log.level must not be empty");
    }

    Ok(())
}

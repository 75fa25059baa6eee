use super::{LogFormat, PrunerConfig, UnknownErrorPolicy};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "CWPRUNE_";

/// Abstraction over environment-variable lookups so tests (and embedders)
/// can supply their own source of overrides.
///
/// Keys are passed without the `CWPRUNE_` prefix.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority below CLI flags).
pub fn apply_env_overrides<E: EnvSource>(config: &mut PrunerConfig, env: &E) -> Result<()> {
    if let Some(pattern) = env.get("FILTER") {
        config.filter.pattern = pattern;
    }

    // AWS client
    if let Some(region) = get_env_non_empty(env, "REGION") {
        config.aws.region = Some(region);
    }
    if let Some(profile) = get_env_non_empty(env, "PROFILE") {
        config.aws.profile = Some(profile);
    }
    if let Some(endpoint) = get_env_non_empty(env, "ENDPOINT_URL") {
        config.aws.endpoint_url = Some(endpoint);
    }

    // Retry
    if let Some(val) = get_env_u32(env, "MAX_RETRIES")? {
        config.retry.max_retries = val;
    }
    if let Some(val) = get_env_u64(env, "INITIAL_BACKOFF_MS")? {
        config.retry.initial_backoff_ms = val;
    }
    if let Some(val) = get_env_u64(env, "MAX_BACKOFF_MS")? {
        config.retry.max_backoff_ms = val;
    }
    if let Some(val) = get_env_bool(env, "RETRY_JITTER")? {
        config.retry.jitter = val;
    }

    if let Some(policy) = env.get("ON_UNKNOWN_ERROR") {
        config.on_unknown_error = policy
            .parse::<UnknownErrorPolicy>()
            .with_context(|| format!("Invalid {}ON_UNKNOWN_ERROR value", ENV_PREFIX))?;
    }
    if let Some(val) = get_env_bool(env, "DRY_RUN")? {
        config.dry_run = val;
    }

    // Logging
    if let Some(level) = env.get("LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = env.get("LOG_FORMAT") {
        config.log.format = format
            .parse::<LogFormat>()
            .with_context(|| format!("Invalid {}LOG_FORMAT value", ENV_PREFIX))?;
    }

    Ok(())
}

fn get_env_non_empty<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.trim().is_empty())
}

fn get_env_u32<E: EnvSource>(env: &E, key: &str) -> Result<Option<u32>> {
    match env.get(key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<u32>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_u64<E: EnvSource>(env: &E, key: &str) -> Result<Option<u64>> {
    match env.get(key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match env.get(key) {
        Some(val) => {
            let parsed = match val.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(anyhow!(
                        "Failed to parse {}{} (expected bool): {}",
                        ENV_PREFIX,
                        key,
                        other
                    ))
                }
            };
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

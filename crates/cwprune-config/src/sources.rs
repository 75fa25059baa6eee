// Configuration source loading.
//
// Priority order:
// 1. Environment variables (CWPRUNE_* prefix)
// 2. Config file path from CWPRUNE_CONFIG
// 3. Inline config content from CWPRUNE_CONFIG_CONTENT
// 4. Default config files (./cwprune.toml, ./.cwprune.toml)
// 5. Built-in defaults

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::*;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;

const DEFAULT_CONFIG_FILES: &[&str] = &["./cwprune.toml", "./.cwprune.toml"];

/// Load configuration using native environment/file access.
pub fn load_config() -> Result<PrunerConfig> {
    let mut config = PrunerConfig::default();

    if let Some(file_config) = load_from_file()? {
        config.merge(file_config);
    }

    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

fn load_from_file() -> Result<Option<PrunerConfig>> {
    if let Some(path) = StdEnvSource.get("CONFIG") {
        return read_config_file(Path::new(&path)).map(Some);
    }

    if let Some(content) = StdEnvSource.get("CONFIG_CONTENT") {
        let config: PrunerConfig = toml::from_str(&content).with_context(|| {
            format!("Failed to parse inline config from {}CONFIG_CONTENT", ENV_PREFIX)
        })?;
        return Ok(Some(config));
    }

    for path in DEFAULT_CONFIG_FILES {
        let path = Path::new(path);
        if path.exists() {
            return read_config_file(path).map(Some);
        }
    }

    Ok(None)
}

fn read_config_file(path: &Path) -> Result<PrunerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from a specific file path (for CLI --config flag).
/// Returns error if file doesn't exist or can't be parsed. Not validated.
pub fn load_from_file_path(path: impl AsRef<Path>) -> Result<PrunerConfig> {
    let file_config = read_config_file(path.as_ref())?;
    layer_over_defaults(Some(file_config), &StdEnvSource)
}

/// Load configuration, returning defaults plus env overrides when no config
/// file is present. A config file that exists but is unreadable fails the load.
/// Not validated.
pub fn load_or_default() -> Result<PrunerConfig> {
    layer_over_defaults(load_from_file()?, &StdEnvSource)
}

fn layer_over_defaults<E: EnvSource>(
    file_config: Option<PrunerConfig>,
    env: &E,
) -> Result<PrunerConfig> {
    let mut config = PrunerConfig::default();
    if let Some(file_config) = file_config {
        config.merge(file_config);
    }
    env_overrides::apply_env_overrides(&mut config, env)?;
    Ok(config)
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_config_file_parses_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            dry_run = true

            [filter]
            pattern = "/aws/batch"

            [log]
            level = "warn"
            format = "json"
            "#
        )
        .unwrap();

        let config = read_config_file(file.path()).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.filter.pattern, "/aws/batch");
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn read_config_file_reports_path_on_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[filter\npattern = 1").unwrap();

        let err = read_config_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn read_config_file_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_config_file(&dir.path().join("absent.toml")).is_err());
    }

    struct EmptyFilterEnv;

    impl EnvSource for EmptyFilterEnv {
        fn get(&self, key: &str) -> Option<String> {
            (key == "FILTER").then(String::new)
        }
    }

    #[test]
    fn layered_config_is_left_unvalidated() {
        let file_config = PrunerConfig::from_toml_str("[retry]\nmax_retries = 5").unwrap();
        let config = layer_over_defaults(Some(file_config), &EmptyFilterEnv).unwrap();

        assert_eq!(config.filter.pattern, "");
        assert_eq!(config.retry.max_retries, 5);
        assert!(config.validate().is_err());
    }
}

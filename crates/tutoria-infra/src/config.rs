//! Application configuration loader for Tutoria.
//!
//! Reads a TOML file into [`AppConfig`], then applies `TUTORIA_*`
//! environment overrides. A missing file means "all defaults"; a file that
//! exists but cannot be read or parsed is an error, so a typo never starts
//! the server with silently different settings.

use std::path::Path;

use secrecy::SecretString;
use tutoria_types::config::{AppConfig, ProviderConfig};
use tutoria_types::error::ConfigError;

pub const ENV_HOST: &str = "TUTORIA_HOST";
pub const ENV_PORT: &str = "TUTORIA_PORT";
pub const ENV_DATABASE_URL: &str = "TUTORIA_DATABASE_URL";
/// Comma-separated model fallback list, cheapest first.
pub const ENV_MODELS: &str = "TUTORIA_MODELS";

/// Where the file layer of a loaded configuration came from.
///
/// Loading runs before tracing is initialised, so the caller logs this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// The TOML file was read and parsed.
    File,
    /// No file existed at the path; built-in defaults were used.
    Defaults,
}

/// Load configuration from `path` and the process environment.
pub async fn load_config(path: &Path) -> Result<(AppConfig, ConfigSource), ConfigError> {
    let (mut config, source) = read_config_file(path).await?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok((config, source))
}

/// Read and parse the TOML file, or return defaults if it does not exist.
pub async fn read_config_file(path: &Path) -> Result<(AppConfig, ConfigSource), ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok((AppConfig::default(), ConfigSource::Defaults));
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    let config = toml::from_str::<AppConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    Ok((config, ConfigSource::File))
}

/// Overlay environment variables on top of file configuration.
///
/// `lookup` abstracts the environment so overrides can be tested without
/// touching process state. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get(ENV_HOST) {
        config.server.host = host.trim().to_string();
    }
    if let Some(port) = get(ENV_PORT) {
        config.server.port = port.trim().parse().map_err(|_| {
            ConfigError::Invalid(format!("{ENV_PORT} must be a port number, got '{port}'"))
        })?;
    }
    if let Some(url) = get(ENV_DATABASE_URL) {
        config.database.url = url.trim().to_string();
    }
    if let Some(models) = get(ENV_MODELS) {
        let models: Vec<String> = models
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        if models.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{ENV_MODELS} must name at least one model"
            )));
        }
        config.generator.models = models;
    }

    Ok(())
}

/// Read the provider API key from the environment variable the config names.
pub fn resolve_api_key(provider: &ProviderConfig) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(provider, |key| std::env::var(key).ok())
}

/// [`resolve_api_key`] with an injectable environment.
///
/// A missing or blank key is [`ConfigError::MissingApiKey`].
pub fn resolve_api_key_with<F>(
    provider: &ProviderConfig,
    lookup: F,
) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(&provider.api_key_env) {
        Some(key) if !key.trim().is_empty() => Ok(SecretString::from(key.trim().to_string())),
        _ => Err(ConfigError::MissingApiKey {
            env_var: provider.api_key_env.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn test_missing_file_returns_defaults() {
        let tmp = TempDir::new().unwrap();
        let (config, source) = read_config_file(&tmp.path().join("tutoria.toml"))
            .await
            .unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.generator.models.len(), 2);
    }

    #[tokio::test]
    async fn test_valid_toml_is_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tutoria.toml");
        tokio::fs::write(
            &path,
            r#"
[server]
port = 9000

[generator]
models = ["gemini-2.0-flash-lite"]
deadline_secs = 45
"#,
        )
        .await
        .unwrap();

        let (config, source) = read_config_file(&path).await.unwrap();
        assert_eq!(source, ConfigSource::File);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.generator.models, vec!["gemini-2.0-flash-lite"]);
        assert_eq!(config.generator.deadline_secs, 45);
    }

    #[tokio::test]
    async fn test_invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tutoria.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let err = read_config_file(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_HOST, "0.0.0.0"),
                (ENV_PORT, "3000"),
                (ENV_DATABASE_URL, "sqlite::memory:"),
                (ENV_MODELS, " fast , , pro "),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.generator.models, vec!["fast", "pro"]);
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, env(&[(ENV_HOST, "  ")])).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_api_key_resolved_from_named_var() {
        let provider = ProviderConfig::default();
        let key = resolve_api_key_with(&provider, env(&[("GEMINI_API_KEY", "k-123")])).unwrap();
        assert_eq!(key.expose_secret(), "k-123");
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let provider = ProviderConfig {
            api_key_env: "CUSTOM_KEY".to_string(),
            ..ProviderConfig::default()
        };
        let err = resolve_api_key_with(&provider, env(&[("CUSTOM_KEY", " ")])).unwrap_err();
        match err {
            ConfigError::MissingApiKey { env_var } => assert_eq!(env_var, "CUSTOM_KEY"),
            other => panic!("Expected MissingApiKey, got {other:?}"),
        }
    }
}

//! Application configuration types for Tutoria.
//!
//! `AppConfig` mirrors `tutoria.toml`. Every section and field has a default,
//! so an absent file or a partial file both produce a runnable config.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "sqlite://tutoria.db?mode=rwc".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Settings for the conversation response generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Fallback model list, cheapest/fastest first.
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on one generation request, retries and backoff included.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_models() -> Vec<String> {
    vec!["gemini-2.0-flash".to_string(), "gemini-1.5-flash".to_string()]
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

fn default_deadline_secs() -> u64 {
    90
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

/// Generative-AI provider endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Per-call HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Bridge tracing spans to OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.generator.models.len(), 2);
        assert_eq!(config.generator.deadline_secs, 90);
        assert_eq!(config.provider.api_key_env, "GEMINI_API_KEY");
        assert!(!config.observability.otel);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
[server]
port = 9000

[generator]
models = ["gemini-2.5-flash"]
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.generator.models, vec!["gemini-2.5-flash"]);
        assert_eq!(config.generator.max_output_tokens, 2048);
        assert_eq!(config.database.url, "sqlite://tutoria.db?mode=rwc");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.generator.models, default_models());
    }
}

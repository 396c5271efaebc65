//! # Configuration
//!
//! Runtime settings for the intake engine, layered in this order (later wins):
//!
//! 1. built-in defaults ([`IntakeConfig::default`])
//! 2. an optional TOML file
//! 3. `TICKETDESK__<SECTION>__<KEY>` environment variables
//!    (e.g. `TICKETDESK__RESOLVER__MAX_ATTEMPTS=5`)
//! 4. the legacy `ORDER_API_BASE_URL` and `API_KEY` variables
//!
//! Every field has a default, so an empty file or no file at all is valid.
//! [`IntakeConfig::validate`] runs after loading.

use crate::constants::{defaults, env_vars};
use crate::error::{IntakeError, Result};
use crate::parsing::Confidence;
use crate::resolution::{BatchOptions, ChunkingPolicy};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Order-status endpoint connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderApiConfig {
    /// Base URL; `orders/{id}` is appended to it
    pub base_url: String,
    pub api_key: String,
    pub api_key_header: String,
    pub timeout_ms: u64,
}

impl Default for OrderApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            api_key_header: defaults::API_KEY_HEADER.to_string(),
            timeout_ms: defaults::ORDER_API_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub concurrency_limit: usize,
    pub max_attempts: u32,
    pub inter_attempt_delay_ms: u64,
    /// `1.0` keeps the pause between attempts fixed
    pub backoff_multiplier: f64,
    pub max_inter_attempt_delay_ms: u64,
    pub retry_only_recoverable: bool,
    pub per_request_cap: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: defaults::CONCURRENCY_LIMIT,
            max_attempts: defaults::MAX_ATTEMPTS,
            inter_attempt_delay_ms: defaults::INTER_ATTEMPT_DELAY_MS,
            backoff_multiplier: defaults::BACKOFF_MULTIPLIER,
            max_inter_attempt_delay_ms: defaults::MAX_INTER_ATTEMPT_DELAY_MS,
            retry_only_recoverable: false,
            per_request_cap: defaults::PER_REQUEST_CAP,
        }
    }
}

impl ResolverConfig {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            concurrency_limit: self.concurrency_limit,
            max_attempts: self.max_attempts,
            per_request_cap: self.per_request_cap,
            inter_attempt_delay: Duration::from_millis(self.inter_attempt_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
            max_inter_attempt_delay: Duration::from_millis(self.max_inter_attempt_delay_ms),
            retry_only_recoverable: self.retry_only_recoverable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub threshold: usize,
    pub chunk_size: usize,
    pub inter_wave_pause_ms: u64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::CHUNKING_THRESHOLD,
            chunk_size: defaults::CHUNK_SIZE,
            inter_wave_pause_ms: defaults::INTER_WAVE_PAUSE_MS,
        }
    }
}

impl ChunkingConfig {
    pub fn policy(&self) -> ChunkingPolicy {
        ChunkingPolicy {
            threshold: self.threshold,
            chunk_size: self.chunk_size,
            inter_wave_pause: Duration::from_millis(self.inter_wave_pause_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: defaults::CACHE_TTL_SECONDS,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Ticket-level processing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeSettings {
    /// Lowest candidate confidence sent to the resolver
    pub minimum_confidence: Confidence,
    /// Reply-template sentences removed from client messages before parsing
    pub boilerplate_phrases: Vec<String>,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            minimum_confidence: Confidence::Medium,
            boilerplate_phrases: vec![defaults::ORDER_ID_REQUEST_TEMPLATE.to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    pub order_api: OrderApiConfig,
    pub resolver: ResolverConfig,
    pub chunking: ChunkingConfig,
    pub cache: CacheConfig,
    pub intake: IntakeSettings,
}

impl IntakeConfig {
    /// Load from defaults, an optional TOML file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_with_env(path, env)
    }

    /// Defaults plus the process environment
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load using `env` in place of the process environment
    pub fn load_with_env(path: Option<&Path>, env: HashMap<String, String>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let legacy_base_url = env.get(env_vars::LEGACY_ORDER_API_BASE_URL).cloned();
        let legacy_api_key = env.get(env_vars::LEGACY_API_KEY).cloned();

        builder = builder.add_source(
            Environment::with_prefix(env_vars::CONFIG_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("intake.boilerplate_phrases")
                .source(Some(env.into_iter().collect())),
        );

        if let Some(base_url) = legacy_base_url.filter(|v| !v.trim().is_empty()) {
            builder = builder.set_override("order_api.base_url", base_url)?;
        }
        if let Some(api_key) = legacy_api_key.filter(|v| !v.trim().is_empty()) {
            builder = builder.set_override("order_api.api_key", api_key)?;
        }

        let config: IntakeConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(config = %config.sanitized_json(), "Configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolver.concurrency_limit == 0 {
            return Err(IntakeError::ConfigurationError(
                "resolver.concurrency_limit must be greater than 0".to_string(),
            ));
        }
        if self.resolver.max_attempts == 0 {
            return Err(IntakeError::ConfigurationError(
                "resolver.max_attempts must be greater than 0".to_string(),
            ));
        }
        if !self.resolver.backoff_multiplier.is_finite() || self.resolver.backoff_multiplier <= 0.0 {
            return Err(IntakeError::ConfigurationError(format!(
                "resolver.backoff_multiplier must be a positive number, got {}",
                self.resolver.backoff_multiplier
            )));
        }
        if self.resolver.per_request_cap == 0 {
            return Err(IntakeError::ConfigurationError(
                "resolver.per_request_cap must be greater than 0".to_string(),
            ));
        }
        if self.chunking.chunk_size == 0 {
            return Err(IntakeError::ConfigurationError(
                "chunking.chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.chunking.chunk_size > self.resolver.per_request_cap {
            return Err(IntakeError::ConfigurationError(format!(
                "chunking.chunk_size ({}) cannot exceed resolver.per_request_cap ({})",
                self.chunking.chunk_size, self.resolver.per_request_cap
            )));
        }
        let base_url = self.order_api.base_url.trim();
        if !base_url.is_empty() {
            reqwest::Url::parse(base_url).map_err(|e| {
                IntakeError::ConfigurationError(format!(
                    "order_api.base_url '{base_url}' is not a valid URL: {e}"
                ))
            })?;
        }
        Ok(())
    }

    /// JSON view with secrets masked, safe to log or print
    pub fn sanitized_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        mask_sensitive(&mut value);
        value
    }
}

const SENSITIVE_PATTERNS: [&str; 4] = ["secret", "key", "token", "password"];

fn mask_sensitive(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                // Header names are not secrets.
                let is_sensitive = !key_lower.ends_with("_header")
                    && SENSITIVE_PATTERNS.iter().any(|p| key_lower.contains(p));
                if !is_sensitive {
                    mask_sensitive(val);
                    continue;
                }
                *val = match val {
                    serde_json::Value::String(s) if s.is_empty() => "[EMPTY]".into(),
                    serde_json::Value::String(s) if s.chars().count() > 4 => {
                        let chars: Vec<char> = s.chars().collect();
                        let head: String = chars[..2].iter().collect();
                        let tail: String = chars[chars.len() - 2..].iter().collect();
                        format!("[MASKED: {head}***{tail}]").into()
                    }
                    _ => "[MASKED]".into(),
                };
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(mask_sensitive),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = IntakeConfig::load_with_env(None, HashMap::new()).unwrap();
        assert_eq!(config, IntakeConfig::default());
        assert_eq!(config.resolver.batch_options(), BatchOptions::default());
        assert_eq!(config.chunking.policy(), ChunkingPolicy::default());
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.intake.minimum_confidence, Confidence::Medium);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[order_api]
base_url = "https://orders.example.com/api"

[resolver]
max_attempts = 5
backoff_multiplier = 2.0
retry_only_recoverable = true

[intake]
minimum_confidence = "high"
"#
        )
        .unwrap();

        let config = IntakeConfig::load_with_env(Some(file.path()), HashMap::new()).unwrap();
        assert_eq!(config.order_api.base_url, "https://orders.example.com/api");
        assert_eq!(config.resolver.max_attempts, 5);
        assert_eq!(config.resolver.concurrency_limit, 6);
        assert_eq!(config.intake.minimum_confidence, Confidence::High);

        let options = config.resolver.batch_options();
        assert!(options.retry_only_recoverable);
        assert!(matches!(
            options.backoff(),
            crate::resolution::BackoffStrategy::Exponential { .. }
        ));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[resolver]\nmax_attempts = 5").unwrap();

        let config = IntakeConfig::load_with_env(
            Some(file.path()),
            env(&[
                ("TICKETDESK__RESOLVER__MAX_ATTEMPTS", "2"),
                ("TICKETDESK__CACHE__ENABLED", "false"),
                ("ORDER_API_BASE_URL", "https://legacy.example.com"),
                ("API_KEY", "abcdef123456"),
            ]),
        )
        .unwrap();

        assert_eq!(config.resolver.max_attempts, 2);
        assert!(!config.cache.enabled);
        assert_eq!(config.order_api.base_url, "https://legacy.example.com");
        assert_eq!(config.order_api.api_key, "abcdef123456");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = IntakeConfig::load_with_env(
            Some(Path::new("/nonexistent/ticketdesk.toml")),
            HashMap::new(),
        );
        assert!(matches!(result, Err(IntakeError::ConfigurationError(_))));
    }

    #[test]
    fn test_validation_rules() {
        let mut config = IntakeConfig::default();
        config.resolver.concurrency_limit = 0;
        assert!(config.validate().is_err());

        let mut config = IntakeConfig::default();
        config.resolver.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = IntakeConfig::default();
        config.resolver.backoff_multiplier = 0.0;
        assert!(config.validate().is_err());

        let mut config = IntakeConfig::default();
        config.resolver.per_request_cap = 0;
        assert!(config.validate().is_err());

        let mut config = IntakeConfig::default();
        config.chunking.chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = IntakeConfig::default();
        config.chunking.chunk_size = 60;
        assert!(config.validate().is_err());

        let mut config = IntakeConfig::default();
        config.order_api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sanitized_json_masks_api_key() {
        let mut config = IntakeConfig::default();
        config.order_api.api_key = "abcdef123456".to_string();
        let json = config.sanitized_json();
        assert_eq!(json["order_api"]["api_key"], "[MASKED: ab***56]");
        assert_eq!(json["order_api"]["api_key_header"], "X-Api-Key");
        assert!(!json.to_string().contains("abcdef123456"));
    }
}

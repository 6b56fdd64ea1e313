use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the math tutor proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub groq: GroqConfig,
    pub redis: RedisConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub solve_path: String,
    /// Optional bearer token required on every route except /health
    #[serde(default)]
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Upstream credential. Absence is reported per request, not at startup.
    #[serde(default)]
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub complex_temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    /// Client-side timeout; none by default so the hosting environment decides
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub database: u8,
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_size: usize,
    pub timeout_seconds: u64,
    pub create_timeout_seconds: u64,
    pub recycle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub enabled: bool,
    /// Entries kept per user; older ones are trimmed on append
    pub max_entries: usize,
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::debug!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("MATH_TUTOR_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = Self::from_file(&config_path);
        config.apply_env_overrides();

        // Validate configuration - log warnings but don't fail
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Parse a YAML config file, falling back to defaults when missing or broken
    pub fn from_file(config_path: &str) -> Self {
        if !Path::new(config_path).exists() {
            tracing::info!("Config file not found at {} - using defaults", config_path);
            return Self::default();
        }

        match fs::read_to_string(config_path) {
            Ok(contents) => Self::from_yaml(&contents).unwrap_or_else(|e| {
                tracing::error!(
                    "Failed to parse config file {}: {} - using defaults",
                    config_path,
                    e
                );
                Self::default()
            }),
            Err(e) => {
                tracing::error!(
                    "Failed to read config file {}: {} - using defaults",
                    config_path,
                    e
                );
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        let config = serde_yaml::from_str::<Config>(contents)?;
        tracing::info!("Loaded configuration from YAML");
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(bind) = lookup("MATH_TUTOR_HTTP_BIND") {
            self.server.bind = bind;
        }
        if let Some(path) = lookup("MATH_TUTOR_HTTP_PATH") {
            self.server.solve_path = path;
        }
        if let Some(token) = lookup("MATH_TUTOR_BEARER_TOKEN") {
            self.server.bearer_token = Some(token).filter(|t| !t.is_empty());
        }

        // Groq overrides
        if let Some(api_key) = lookup("GROQ_API_KEY") {
            self.groq.api_key = Some(api_key);
        }
        if let Some(url) = lookup("GROQ_API_URL") {
            self.groq.api_url = url;
        }
        if let Some(model) = lookup("GROQ_MODEL") {
            self.groq.model = model;
        }
        if let Some(top_p) = lookup("GROQ_TOP_P") {
            if let Ok(v) = top_p.parse() {
                self.groq.top_p = v;
            }
        }
        if let Some(max_tokens) = lookup("GROQ_MAX_TOKENS") {
            if let Ok(v) = max_tokens.parse() {
                self.groq.max_tokens = v;
            }
        }
        if let Some(timeout) = lookup("GROQ_TIMEOUT_SECONDS") {
            if let Ok(v) = timeout.parse() {
                self.groq.timeout_seconds = Some(v);
            }
        }

        // Redis overrides
        if let Some(host) = lookup("REDIS_HOST") {
            self.redis.host = host;
        }
        if let Some(port) = lookup("REDIS_PORT") {
            if let Ok(port_num) = port.parse() {
                self.redis.port = port_num;
            }
        }
        if let Some(db) = lookup("REDIS_DB") {
            if let Ok(db_num) = db.parse() {
                self.redis.database = db_num;
            }
        }

        // History overrides
        if let Some(enabled) = lookup("MATH_TUTOR_HISTORY_ENABLED") {
            self.history.enabled = matches!(enabled.as_str(), "1" | "true" | "yes");
        }
        if let Some(max) = lookup("MATH_TUTOR_HISTORY_MAX_ENTRIES") {
            if let Ok(v) = max.parse() {
                self.history.max_entries = v;
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.groq.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            return Err("GROQ_API_KEY is not set; every solve will fail with a configuration error".into());
        }

        if !(0.0..=2.0).contains(&self.groq.temperature)
            || !(0.0..=2.0).contains(&self.groq.complex_temperature)
        {
            return Err("Groq temperatures must be between 0.0 and 2.0".into());
        }

        if !(0.0..=1.0).contains(&self.groq.top_p) {
            return Err("Groq top_p must be between 0.0 and 1.0".into());
        }

        if self.groq.max_tokens == 0 {
            return Err("Groq max_tokens cannot be 0".into());
        }

        if !self.server.solve_path.starts_with('/') {
            return Err("server.solve_path must start with '/'".into());
        }

        if self.history.enabled && self.redis.port == 0 {
            return Err("Redis port cannot be 0 when history is enabled".into());
        }

        Ok(())
    }

    /// Get Redis URL with password from environment
    pub fn get_redis_url(&self) -> String {
        let password = env::var("REDIS_PASSWORD").unwrap_or_default();

        if password.is_empty() {
            format!(
                "redis://{}:{}/{}",
                self.redis.host, self.redis.port, self.redis.database
            )
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                password, self.redis.host, self.redis.port, self.redis.database
            )
        }
    }

    /// Get pool timeout as Duration
    pub fn get_pool_timeout(&self) -> Duration {
        Duration::from_secs(self.redis.pool.timeout_seconds)
    }

    /// Get pool create timeout as Duration
    pub fn get_pool_create_timeout(&self) -> Duration {
        Duration::from_secs(self.redis.pool.create_timeout_seconds)
    }

    /// Get pool recycle timeout as Duration
    pub fn get_pool_recycle_timeout(&self) -> Duration {
        Duration::from_secs(self.redis.pool.recycle_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:8787".to_string(),
                solve_path: "/solve".to_string(),
                bearer_token: None,
            },
            groq: GroqConfig {
                api_key: None,
                api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
                model: "llama3-70b-8192".to_string(),
                temperature: 0.3,
                complex_temperature: 0.4,
                top_p: 0.9,
                max_tokens: 4096,
                timeout_seconds: None,
            },
            redis: RedisConfig {
                host: "localhost".to_string(),
                port: 6379,
                database: 0,
                pool: PoolConfig {
                    max_size: 16,
                    timeout_seconds: 5,
                    create_timeout_seconds: 5,
                    recycle_timeout_seconds: 5,
                },
            },
            history: HistoryConfig {
                enabled: false,
                max_entries: 500,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_upstream_parameters() {
        let cfg = Config::default();
        assert_eq!(cfg.groq.model, "llama3-70b-8192");
        assert!((cfg.groq.temperature - 0.3).abs() < 1e-6);
        assert!((cfg.groq.complex_temperature - 0.4).abs() < 1e-6);
        assert!((cfg.groq.top_p - 0.9).abs() < 1e-6);
        assert_eq!(cfg.groq.max_tokens, 4096);
        assert_eq!(cfg.groq.timeout_seconds, None);
        assert!(cfg.groq.api_key.is_none());
    }

    #[test]
    fn test_env_overrides_applied() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GROQ_API_KEY", "gsk_test"),
            ("GROQ_MODEL", "llama-3.3-70b-versatile"),
            ("GROQ_MAX_TOKENS", "2048"),
            ("GROQ_TOP_P", "not-a-number"),
            ("MATH_TUTOR_HTTP_PATH", "/groq-solver"),
            ("MATH_TUTOR_BEARER_TOKEN", ""),
            ("MATH_TUTOR_HISTORY_ENABLED", "true"),
            ("REDIS_PORT", "6380"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.groq.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(cfg.groq.model, "llama-3.3-70b-versatile");
        assert_eq!(cfg.groq.max_tokens, 2048);
        // Unparseable values leave the previous setting alone
        assert!((cfg.groq.top_p - 0.9).abs() < 1e-6);
        assert_eq!(cfg.server.solve_path, "/groq-solver");
        assert_eq!(cfg.server.bearer_token, None);
        assert!(cfg.history.enabled);
        assert_eq!(cfg.redis.port, 6380);
    }

    #[test]
    fn test_validate_flags_missing_key() {
        let cfg = Config::default();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.groq.api_key = Some("gsk_test".to_string());
        assert!(cfg.validate().is_ok());

        cfg.groq.top_p = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_yaml_round_trip_keeps_overrides() {
        let yaml = r#"
server:
  bind: "0.0.0.0:9000"
  solve_path: "/solve"
groq:
  api_url: "http://localhost:1234/v1/chat/completions"
  model: "test-model"
  temperature: 0.1
  complex_temperature: 0.2
  top_p: 0.5
  max_tokens: 128
redis:
  host: "redis"
  port: 6379
  database: 2
  pool:
    max_size: 4
    timeout_seconds: 1
    create_timeout_seconds: 1
    recycle_timeout_seconds: 1
history:
  enabled: true
  max_entries: 10
"#;
        let cfg = Config::from_yaml(yaml).expect("valid yaml config");
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert_eq!(cfg.groq.model, "test-model");
        assert!(cfg.groq.api_key.is_none());
        assert_eq!(cfg.redis.database, 2);
        assert_eq!(cfg.history.max_entries, 10);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = Config::from_file("/nonexistent/math-tutor/config.yaml");
        assert_eq!(cfg.server.solve_path, "/solve");
    }
}

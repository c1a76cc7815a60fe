//! Configuration management for deploylint
//!
//! Settings are layered: TOML file, then `DEPLOYLINT_*` environment
//! variables, then CLI flags (applied by the caller).

use deploylint_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Platform connection settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Executor tunables
    #[serde(default)]
    pub executor: ExecutorConfigSection,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Check selection and per-check tunables
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (DEPLOYLINT_ prefix)
    pub fn merge_env(mut self) -> Self {
        if let Ok(val) = std::env::var("DEPLOYLINT_SERVER_URL") {
            self.server.url = val;
        }
        if let Ok(val) = std::env::var("DEPLOYLINT_API_KEY") {
            self.server.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("DEPLOYLINT_SPACE") {
            self.server.space = val;
        }

        if let Ok(val) = std::env::var("DEPLOYLINT_MAX_CONCURRENCY") {
            if let Ok(n) = val.parse() {
                self.executor.max_concurrency = n;
            }
        }
        if let Ok(val) = std::env::var("DEPLOYLINT_ATTEMPTS") {
            if let Ok(n) = val.parse() {
                self.executor.attempts = n;
            }
        }

        if let Ok(val) = std::env::var("DEPLOYLINT_MIN_SEVERITY") {
            self.report.min_severity = val;
        }

        if let Ok(val) = std::env::var("DEPLOYLINT_SKIP_CHECKS") {
            self.checks.skip = val;
        }
        if let Ok(val) = std::env::var("DEPLOYLINT_ONLY_CHECKS") {
            self.checks.only = val;
        }

        if let Ok(val) = std::env::var("DEPLOYLINT_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("DEPLOYLINT_LOG_FORMAT") {
            self.logging.format = val;
        }

        self
    }

    /// Validate settings the run cannot start without
    pub fn validate(&self) -> Result<()> {
        if self.server.url.is_empty() {
            return Err(Error::MissingConfig {
                key: String::from("server.url"),
            });
        }
        if self.server.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(Error::MissingConfig {
                key: String::from("server.api_key"),
            });
        }
        if self.server.space.is_empty() {
            return Err(Error::MissingConfig {
                key: String::from("server.space"),
            });
        }
        if self.executor.attempts == 0 {
            return Err(Error::Configuration(String::from(
                "executor.attempts must be at least 1",
            )));
        }
        Ok(())
    }
}

/// Platform connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Platform base URL (e.g., "https://deploy.example.com")
    #[serde(default)]
    pub url: String,

    /// API key for authentication
    pub api_key: Option<String>,

    /// Space name or id to audit
    #[serde(default)]
    pub space: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            space: String::new(),
            request_timeout_seconds: 30,
        }
    }
}

/// Executor tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfigSection {
    /// Maximum checks executing at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Attempts per check before it is considered unrecoverable
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Record a synthesized result for every failed attempt, not just the last
    #[serde(default = "default_true")]
    pub record_failed_attempts: bool,

    /// Overall run deadline in seconds (0 = none)
    #[serde(default)]
    pub deadline_seconds: u64,
}

fn default_max_concurrency() -> usize {
    15
}

fn default_attempts() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

impl Default for ExecutorConfigSection {
    fn default() -> Self {
        Self {
            max_concurrency: 15,
            attempts: 3,
            record_failed_attempts: true,
            deadline_seconds: 0,
        }
    }
}

/// Report settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Minimum severity itemized in the report
    #[serde(default = "default_min_severity")]
    pub min_severity: String,
}

fn default_min_severity() -> String {
    String::from("warning")
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_severity: default_min_severity(),
        }
    }
}

/// Check selection and per-check tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksConfig {
    /// Comma-separated check ids to skip
    #[serde(default)]
    pub skip: String,

    /// Comma-separated check ids to run exclusively (empty = all)
    #[serde(default)]
    pub only: String,

    /// Environments above this count are flagged
    #[serde(default = "default_max_environments")]
    pub max_environments: usize,

    /// Days without a deployment task before a project counts as unused
    #[serde(default = "default_max_days")]
    pub max_days_since_last_task: i64,

    /// Minutes a task may sit queued before it is flagged
    #[serde(default = "default_max_queued_minutes")]
    pub max_queued_minutes: i64,

    /// Days an account credential may go unrotated
    #[serde(default = "default_max_unrotated_days")]
    pub max_account_age_days: i64,

    /// Cap on projects fetched by project-iterating checks (0 = all)
    #[serde(default = "default_fetch_limit")]
    pub max_projects: usize,

    /// Cap on targets fetched by target-iterating checks (0 = all)
    #[serde(default = "default_fetch_limit")]
    pub max_targets: usize,

    /// Cap on tasks fetched by the queue-time check (0 = all)
    #[serde(default = "default_fetch_limit")]
    pub max_tasks: usize,

    /// Regex a target name must match (unset = check disabled)
    pub target_name_pattern: Option<String>,

    /// Regex a variable name must match (unset = check disabled)
    pub variable_name_pattern: Option<String>,

    /// Regex a lifecycle name must match (unset = check disabled)
    pub lifecycle_name_pattern: Option<String>,

    /// Regex a target role must match (unset = check disabled)
    pub target_role_pattern: Option<String>,
}

fn default_max_environments() -> usize {
    10
}

fn default_max_days() -> i64 {
    30
}

fn default_max_queued_minutes() -> i64 {
    10
}

fn default_max_unrotated_days() -> i64 {
    90
}

fn default_fetch_limit() -> usize {
    100
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            skip: String::new(),
            only: String::new(),
            max_environments: default_max_environments(),
            max_days_since_last_task: default_max_days(),
            max_queued_minutes: default_max_queued_minutes(),
            max_account_age_days: default_max_unrotated_days(),
            max_projects: default_fetch_limit(),
            max_targets: default_fetch_limit(),
            max_tasks: default_fetch_limit(),
            target_name_pattern: None,
            variable_name_pattern: None,
            lifecycle_name_pattern: None,
            target_role_pattern: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server.url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.server.api_key = Some(key.into());
        self
    }

    pub fn space(mut self, space: impl Into<String>) -> Self {
        self.config.server.space = space.into();
        self
    }

    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.config.executor.max_concurrency = n;
        self
    }

    pub fn attempts(mut self, n: u32) -> Self {
        self.config.executor.attempts = n;
        self
    }

    pub fn min_severity(mut self, severity: impl Into<String>) -> Self {
        self.config.report.min_severity = severity.into();
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [server]
            url = "https://deploy.example.com"
            api_key = "API-SECRET"
            space = "Spaces-1"

            [executor]
            max_concurrency = 5
            attempts = 2

            [report]
            min_severity = "error"

            [checks]
            skip = "DL-SEC-001, DL-NAME-002"
            max_environments = 4
            target_name_pattern = "^[a-z-]+$"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.server.url, "https://deploy.example.com");
        assert_eq!(config.server.api_key, Some(String::from("API-SECRET")));
        assert_eq!(config.executor.max_concurrency, 5);
        assert_eq!(config.executor.attempts, 2);
        assert!(config.executor.record_failed_attempts);
        assert_eq!(config.report.min_severity, "error");
        assert_eq!(config.checks.skip, "DL-SEC-001, DL-NAME-002");
        assert_eq!(config.checks.max_environments, 4);
        assert_eq!(
            config.checks.target_name_pattern.as_deref(),
            Some("^[a-z-]+$")
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .server_url("https://test.example.com")
            .api_key("API-KEY123")
            .space("Spaces-7")
            .max_concurrency(3)
            .min_severity("ok")
            .build();

        assert_eq!(config.server.url, "https://test.example.com");
        assert_eq!(config.server.space, "Spaces-7");
        assert_eq!(config.executor.max_concurrency, 3);
        assert_eq!(config.report.min_severity, "ok");
    }

    #[test]
    fn test_merge_env_overrides_file_values() {
        std::env::set_var("DEPLOYLINT_SPACE", "Spaces-42");
        std::env::set_var("DEPLOYLINT_MIN_SEVERITY", "error");

        let config = Config::builder()
            .server_url("https://deploy.example.com")
            .space("Spaces-1")
            .build()
            .merge_env();

        std::env::remove_var("DEPLOYLINT_SPACE");
        std::env::remove_var("DEPLOYLINT_MIN_SEVERITY");

        assert_eq!(config.server.space, "Spaces-42");
        assert_eq!(config.report.min_severity, "error");
        assert_eq!(config.server.url, "https://deploy.example.com");
    }

    #[test]
    fn test_validate_requires_connection_settings() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = Config::builder()
            .server_url("https://deploy.example.com")
            .api_key("API-KEY")
            .space("Spaces-1")
            .build();
        assert!(config.validate().is_ok());
    }
}

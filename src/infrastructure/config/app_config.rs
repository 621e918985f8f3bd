//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::entities::{AuthToken, CorruptCachePolicy};
use crate::infrastructure::http::DEFAULT_TIMEOUT_SECS;
use crate::infrastructure::image::default_cache_dir;
use crate::infrastructure::image::memory_cache::DEFAULT_CACHE_SIZE;

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Image fetcher configuration, loaded from `config.toml` and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Base URL image paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory fetched images are persisted in.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of decoded images kept in memory.
    #[serde(default = "default_memory_cache_size")]
    pub memory_cache_size: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token attached to downloads.
    #[serde(default)]
    pub token: Option<String>,

    /// Handling of undecodable disk cache files.
    #[serde(default)]
    pub corrupt_cache_policy: CorruptCachePolicy,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_memory_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(base_url) = &args.base_url {
            self.base_url.clone_from(base_url);
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache_dir = Some(cache_dir.clone());
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
        if let Some(policy) = args.corrupt_cache_policy {
            self.corrupt_cache_policy = policy;
        }
    }

    /// Returns effective image cache directory.
    #[must_use]
    pub fn effective_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.clone().or_else(default_cache_dir)
    }

    /// Returns the configured bearer token, if it is usable.
    #[must_use]
    pub fn auth_token(&self) -> Option<AuthToken> {
        self.token.as_deref().and_then(AuthToken::new)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            base_url: default_base_url(),
            cache_dir: None,
            memory_cache_size: DEFAULT_CACHE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
            corrupt_cache_policy: CorruptCachePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
            base_url = "https://api.example.com/v1"
            cache_dir = "/var/cache/netimage"
            memory_cache_size = 10
            token = "abc.def.ghi"
            corrupt_cache_policy = "fail"
            log_path = "/var/log/netimage.log"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache/netimage")));
        assert_eq!(config.memory_cache_size, 10);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.corrupt_cache_policy, CorruptCachePolicy::Fail);
        assert_eq!(config.log_path, Some(PathBuf::from("/var/log/netimage.log")));
        assert_eq!(
            config.auth_token().map(|t| t.as_str().to_string()),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.memory_cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(config.corrupt_cache_policy, CorruptCachePolicy::Refetch);
        assert!(config.auth_token().is_none());
        assert!(config.log_path.is_none());
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = AppConfig::default();
        let args = CliArgs::parse_from([
            "netimage",
            "/avatar",
            "--base-url",
            "https://cdn.example.com",
            "--timeout-secs",
            "5",
            "--corrupt-cache-policy",
            "fail",
            "--log-path",
            "/tmp/cli.log",
        ]);

        config.merge_with_args(&args);

        assert_eq!(config.base_url, "https://cdn.example.com");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.corrupt_cache_policy, CorruptCachePolicy::Fail);
        assert_eq!(config.memory_cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/cli.log")));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = AppConfig {
            token: Some("   ".to_string()),
            ..AppConfig::default()
        };
        assert!(config.auth_token().is_none());
    }
}

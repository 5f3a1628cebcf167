//! Configuration management

use anyhow::{Context, Result};

use crate::defaults::DEFAULT_LOG_FILTER;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// `tracing` filter directive
    pub log_filter: String,

    /// Directory for daily rolling log files (stdout only when unset)
    pub logs_dir: Option<String>,

    /// Abort plan runs on the first rejected step
    pub strict: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let log_filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        let logs_dir = std::env::var("LOGS_DIR").ok().filter(|dir| !dir.is_empty());

        let strict = match std::env::var("HOS_STRICT") {
            Ok(value) => parse_bool(&value)
                .with_context(|| format!("HOS_STRICT must be true or false, got '{}'", value))?,
            Err(_) => false,
        };

        Ok(Self {
            log_filter,
            logs_dir,
            strict,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" YES "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_defaults() {
        std::env::remove_var("RUST_LOG");
        std::env::remove_var("LOGS_DIR");
        std::env::remove_var("HOS_STRICT");

        let config = Config::from_env().unwrap();
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(config.logs_dir.is_none());
        assert!(!config.strict);
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_rejects_bad_strict_flag() {
        std::env::set_var("HOS_STRICT", "sometimes");

        assert!(Config::from_env().is_err());

        // Cleanup
        std::env::remove_var("HOS_STRICT");
    }
}

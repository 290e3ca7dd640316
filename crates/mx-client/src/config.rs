use std::{env, time::Duration};

use crate::client::DEFAULT_OPERATION;

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub operation: String,
    pub timeout: Duration,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080".to_string(),
            operation: DEFAULT_OPERATION.to_string(),
            timeout: Duration::from_secs(30),
            log_level: "mx_client=info,mx_lang=info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(endpoint) = env::var("MX_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Ok(operation) = env::var("MX_OPERATION") {
            if operation.trim().is_empty() {
                eprintln!(
                    "Warning: Empty MX_OPERATION value, using default {}",
                    config.operation
                );
            } else {
                config.operation = operation.trim().to_string();
            }
        }

        if let Ok(timeout_str) = env::var("MX_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                config.timeout = Duration::from_secs(timeout);
            } else {
                eprintln!(
                    "Warning: Invalid MX_TIMEOUT_SECS value '{}', using default {}",
                    timeout_str,
                    config.timeout.as_secs()
                );
            }
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.log_level = log_level;
        } else if let Ok(log_level) = env::var("MX_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(log_format) = env::var("MX_LOG_FORMAT") {
            config.log_format = match log_format.to_lowercase().as_str() {
                "text" | "plain" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    eprintln!(
                        "Warning: Invalid MX_LOG_FORMAT value '{}', using default text",
                        log_format
                    );
                    LogFormat::Text
                }
            };
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 6] = [
        "MX_ENDPOINT",
        "MX_OPERATION",
        "MX_TIMEOUT_SECS",
        "RUST_LOG",
        "MX_LOG_LEVEL",
        "MX_LOG_FORMAT",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:8080");
        assert_eq!(config.operation, "solveProblem");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(matches!(config.log_format, LogFormat::Text));
    }

    // Single test so the process environment is only touched from one thread.
    #[test]
    fn test_config_from_env() {
        let original = VARS.map(|name| env::var(name).ok());

        unsafe {
            env::remove_var("RUST_LOG");
            env::set_var("MX_ENDPOINT", "http://solver.internal:9000/api");
            env::set_var("MX_OPERATION", "multiply");
            env::set_var("MX_TIMEOUT_SECS", "5");
            env::set_var("MX_LOG_LEVEL", "debug");
            env::set_var("MX_LOG_FORMAT", "JSON");
        }

        let config = Config::from_env();
        assert_eq!(config.endpoint, "http://solver.internal:9000/api");
        assert_eq!(config.operation, "multiply");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.log_level, "debug");
        assert!(matches!(config.log_format, LogFormat::Json));

        unsafe {
            env::set_var("MX_OPERATION", "  ");
            env::set_var("MX_TIMEOUT_SECS", "soon");
            env::set_var("MX_LOG_FORMAT", "xml");
        }

        let config = Config::from_env();
        assert_eq!(config.operation, "solveProblem");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(matches!(config.log_format, LogFormat::Text));

        unsafe {
            for (name, value) in VARS.iter().zip(original) {
                match value {
                    Some(val) => env::set_var(name, val),
                    None => env::remove_var(name),
                }
            }
        }
    }
}

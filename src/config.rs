//! Server and client configuration
//! Loaded from a JSON file when present, with environment variable overrides;
//! a missing or unparsable configuration source falls back to documented
//! defaults and is never fatal.

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT};
use log::warn;
use serde::Deserialize;
use std::env;
use std::fs;

/// Server configuration parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Banned substrings; a chat line containing any of these is suppressed
    /// and the sender receives a warning instead.
    pub banned_words: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            banned_words: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration: JSON file (path from `RUSTY_RELAY_CONFIG`, default
    /// `serverConfig.json`), then environment variable overrides.
    pub fn load() -> Self {
        let path =
            env::var("RUSTY_RELAY_CONFIG").unwrap_or_else(|_| "serverConfig.json".to_string());
        let mut config: ServerConfig = read_json_config(&path);
        apply_env_overrides(&mut config.host, &mut config.port);

        if let Ok(words) = env::var("RUSTY_RELAY_BANNED_WORDS") {
            config.banned_words = words
                .split(',')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect();
        }

        config
    }

    /// Address string suitable for binding or connecting
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Client-side configuration: where to find the server
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ClientConfig {
    pub fn load() -> Self {
        let path =
            env::var("RUSTY_RELAY_CONFIG").unwrap_or_else(|_| "clientConfig.json".to_string());
        let mut config: ClientConfig = read_json_config(&path);
        apply_env_overrides(&mut config.host, &mut config.port);
        config
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_json_config<T: Default + for<'de> Deserialize<'de>>(path: &str) -> T {
    match fs::read_to_string(path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(config) => config,
            Err(e) => {
                warn!("Malformed configuration file {}: {}, using defaults", path, e);
                T::default()
            }
        },
        Err(_) => T::default(),
    }
}

fn apply_env_overrides(host: &mut String, port: &mut u16) {
    if let Ok(h) = env::var("RUSTY_RELAY_HOST") {
        *host = h;
    }
    if let Some(p) = env::var("RUSTY_RELAY_PORT").ok().and_then(|p| p.parse().ok()) {
        *port = p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.banned_words.is_empty());
        assert_eq!(config.addr(), format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT));
    }

    #[test]
    fn test_json_parsing() {
        let json = r#"{ "host": "0.0.0.0", "port": 4000, "banned_words": ["spam"] }"#;
        let config: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 4000);
        assert_eq!(config.banned_words, vec!["spam".to_string()]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "port": 9000 }"#;
        let config: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config: ServerConfig = read_json_config("no-such-config-file.json");
        assert_eq!(config.port, DEFAULT_PORT);
    }
}

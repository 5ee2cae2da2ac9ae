//! Server configuration.
//!
//! Configuration can be loaded from:
//! - Environment variables (RELAY_*)
//! - TOML configuration file (`RELAY_CONFIG` or `./relay.toml`)
//! - The first command line argument, as a bind address

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::filter::{AllowAll, ContentFilter, WordFilter};
use crate::router::DEFAULT_REJECTION;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Capacity of the command channel into the ChatServer actor.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Capacity of each connection's outbound queue.
    #[serde(default = "default_client_buffer")]
    pub client_buffer: usize,

    /// Content filter configuration.
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Content filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Reject messages containing banned words.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Words rejected case-insensitively as whole words.
    #[serde(default = "default_banned_words")]
    pub banned_words: Vec<String>,

    /// Acknowledgement text for a rejected message.
    #[serde(default = "default_rejection_message")]
    pub rejection_message: String,
}

fn default_host() -> String {
    std::env::var("RELAY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

fn default_port() -> u16 {
    std::env::var("RELAY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

fn default_command_buffer() -> usize {
    256
}

fn default_client_buffer() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_banned_words() -> Vec<String> {
    ["damn", "shit", "fuck", "bitch", "bastard", "asshole"]
        .iter()
        .map(|w| w.to_string())
        .collect()
}

fn default_rejection_message() -> String {
    DEFAULT_REJECTION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            command_buffer: default_command_buffer(),
            client_buffer: default_client_buffer(),
            filter: FilterConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            banned_words: default_banned_words(),
            rejection_message: default_rejection_message(),
        }
    }
}

impl FilterConfig {
    /// Build the content filter this configuration describes
    pub fn build(&self) -> Box<dyn ContentFilter> {
        if self.enabled {
            Box::new(WordFilter::new(&self.banned_words))
        } else {
            Box::new(AllowAll)
        }
    }
}

impl Config {
    /// Load configuration from file or defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed, or if
    /// `RELAY_CONFIG` names a file that cannot be read.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("RELAY_CONFIG") {
            return Self::from_file(path);
        }

        if Path::new("relay.toml").exists() {
            return Self::from_file("relay.toml");
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Get the address to bind to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

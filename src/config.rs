//! Application configuration
//!
//! Configuration is read once from environment variables at startup and is
//! read-only afterwards. Only the Gemini API key is required; everything else
//! has a default.

use std::env;
use std::fmt;
use thiserror::Error;

/// Default Gemini model when `GEMINI_MODEL` is not set
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini REST endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sampling temperature used for every review
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors that prevent the service from starting
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is absent or blank
    #[error("{0} missing from environment (set it or add it to .env)")]
    MissingVar(&'static str),

    /// An optional variable is set but could not be parsed
    #[error("Invalid value for {name}: {value:?}")]
    InvalidVar {
        /// Variable name
        name: &'static str,
        /// Raw value that failed to parse
        value: String,
    },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Model configuration
    pub model: ModelConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Model configuration for the Gemini text-generation call
#[derive(Clone)]
pub struct ModelConfig {
    /// Gemini model name
    pub model_name: String,
    /// Google API key
    pub api_key: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Gemini API base URL
    pub api_base_url: String,
    /// Transport request timeout in seconds
    pub timeout_secs: u64,
}

// Hand-written so the key never reaches the logs.
impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model_name", &self.model_name)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    ///
    /// Blank values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("GOOGLE_API_KEY").ok_or(ConfigError::MissingVar("GOOGLE_API_KEY"))?;

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidVar {
                name: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match var("GEMINI_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        name: "GEMINI_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            server: ServerConfig {
                port,
                host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            },
            model: ModelConfig {
                model_name: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_key: api_key.trim().to_string(),
                temperature: DEFAULT_TEMPERATURE,
                api_base_url: var("GEMINI_API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                timeout_secs,
            },
        })
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

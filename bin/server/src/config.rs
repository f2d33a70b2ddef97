//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables, using `__` as
//! the nesting separator (`NLU__PROVIDER=dialogflow`,
//! `SESSION__IDLE_TIMEOUT_MINUTES=15`). Configuration is validated once at
//! startup; a bad value stops the server before it binds.

use crate::error::ConfigError;
use reservation_relay_conversation::StoreConfig;
use reservation_relay_nlu::{
    DialogflowClient, DialogflowConfig, EchoClient, NluClient, NluError, NluProvider,
    dialogflow::DEFAULT_BASE_URL,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the webhook listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// NLU service configuration.
    #[serde(default)]
    pub nlu: NluConfig,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Minutes without a message before a session is dropped.
    #[serde(default = "default_idle_timeout_minutes")]
    pub idle_timeout_minutes: i64,

    /// Interval between session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// Reject adult/child answers that contain no number.
    #[serde(default)]
    pub strict_counts: bool,
}

/// NLU service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NluConfig {
    /// Which client to use.
    #[serde(default)]
    pub provider: NluProvider,

    /// Dialogflow project id. Required for `dialogflow`.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Dialogflow OAuth access token. Required for `dialogflow`.
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_language_code")]
    pub language_code: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Longest allowed idle timeout: one week.
pub const MAX_IDLE_TIMEOUT_MINUTES: i64 = 7 * 24 * 60;

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_idle_timeout_minutes() -> i64 {
    30
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

fn default_language_code() -> String {
    "en-US".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
            strict_counts: false,
        }
    }
}

impl SessionConfig {
    /// Store behaviour derived from this configuration.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            strict_counts: self.strict_counts,
        }
    }

    #[must_use]
    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.idle_timeout_minutes)
    }
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            provider: NluProvider::default(),
            project_id: None,
            access_token: None,
            language_code: default_language_code(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl NluConfig {
    /// Builds the configured NLU client.
    ///
    /// # Errors
    ///
    /// Returns an error if the Dialogflow client can't be constructed.
    pub fn build_client(&self) -> Result<Arc<dyn NluClient>, NluError> {
        match self.provider {
            NluProvider::Echo => Ok(Arc::new(EchoClient::new())),
            NluProvider::Dialogflow => {
                let config = DialogflowConfig {
                    base_url: self.base_url.clone(),
                    project_id: self.project_id.clone().unwrap_or_default(),
                    access_token: self.access_token.clone().unwrap_or_default(),
                    language_code: self.language_code.clone(),
                    timeout: Duration::from_secs(self.timeout_seconds),
                };
                Ok(Arc::new(DialogflowClient::new(config)?))
            }
        }
    }
}

impl ServerConfig {
    /// Loads and validates configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing, malformed or invalid.
    pub fn load() -> reservation_relay_core::Result<Self, ConfigError> {
        let config = Self::from_env().map_err(|e| ConfigError::Load {
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Checks values the type system can't.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.idle_timeout_minutes <= 0 {
            return Err(ConfigError::invalid(
                "session.idle_timeout_minutes",
                "must be positive",
            ));
        }
        if self.session.idle_timeout_minutes > MAX_IDLE_TIMEOUT_MINUTES {
            return Err(ConfigError::invalid(
                "session.idle_timeout_minutes",
                format!("must be at most {MAX_IDLE_TIMEOUT_MINUTES}"),
            ));
        }
        if self.session.cleanup_interval_seconds == 0 {
            return Err(ConfigError::invalid(
                "session.cleanup_interval_seconds",
                "must be positive",
            ));
        }
        if self.nlu.timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "nlu.timeout_seconds",
                "must be positive",
            ));
        }

        if self.nlu.provider == NluProvider::Dialogflow {
            if is_blank(self.nlu.project_id.as_deref()) {
                return Err(ConfigError::invalid(
                    "nlu.project_id",
                    "required when nlu.provider is dialogflow",
                ));
            }
            if is_blank(self.nlu.access_token.as_deref()) {
                return Err(ConfigError::invalid(
                    "nlu.access_token",
                    "required when nlu.provider is dialogflow",
                ));
            }
        }

        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

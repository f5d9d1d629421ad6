//! # Backend service configuration
//!
//! The connection parameters for the hosted backend, sourced from the process
//! environment at startup. All six parameters are required; startup fails hard
//! when any of them is missing, and the API key never appears in diagnostic
//! output.
//!
//! | Field | Environment variable |
//! |-------|---------------------|
//! | `api_key` | `CABTRACK_API_KEY` |
//! | `auth_domain` | `CABTRACK_AUTH_DOMAIN` |
//! | `project_id` | `CABTRACK_PROJECT_ID` |
//! | `storage_bucket` | `CABTRACK_STORAGE_BUCKET` |
//! | `messaging_sender_id` | `CABTRACK_MESSAGING_SENDER_ID` |
//! | `app_id` | `CABTRACK_APP_ID` |
//!
//! [`ServiceConfig::from_lookup`] takes the variable lookup as a closure so the
//! loader can be tested without mutating the process environment.

use std::fmt;

use thiserror::Error;

pub const ENV_API_KEY: &str = "CABTRACK_API_KEY";
pub const ENV_AUTH_DOMAIN: &str = "CABTRACK_AUTH_DOMAIN";
pub const ENV_PROJECT_ID: &str = "CABTRACK_PROJECT_ID";
pub const ENV_STORAGE_BUCKET: &str = "CABTRACK_STORAGE_BUCKET";
pub const ENV_MESSAGING_SENDER_ID: &str = "CABTRACK_MESSAGING_SENDER_ID";
pub const ENV_APP_ID: &str = "CABTRACK_APP_ID";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("required configuration variable {0} is not set")]
    Missing(&'static str),
}

/// Connection parameters for the backend service.
#[derive(Clone, PartialEq)]
pub struct ServiceConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

impl ServiceConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let require = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => Err(ConfigError::Missing(name)),
            }
        };

        Ok(Self {
            api_key: require(ENV_API_KEY)?,
            auth_domain: require(ENV_AUTH_DOMAIN)?,
            project_id: require(ENV_PROJECT_ID)?,
            storage_bucket: require(ENV_STORAGE_BUCKET)?,
            messaging_sender_id: require(ENV_MESSAGING_SENDER_ID)?,
            app_id: require(ENV_APP_ID)?,
        })
    }
}

// The API key is a credential; keep it out of logs.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"[REDACTED]")
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_lookup(name: &'static str) -> Option<String> {
        Some(match name {
            ENV_API_KEY => "secret-key",
            ENV_AUTH_DOMAIN => "cabtrack.example.com",
            ENV_PROJECT_ID => "cabtrack-prod",
            ENV_STORAGE_BUCKET => "cabtrack-prod.bucket",
            ENV_MESSAGING_SENDER_ID => "424242",
            ENV_APP_ID => "1:424242:web:abc",
            _ => return None,
        }
        .to_string())
    }

    #[test]
    fn loads_when_all_variables_present() {
        let config = ServiceConfig::from_lookup(full_lookup).unwrap();
        assert_eq!(config.project_id, "cabtrack-prod");
        assert_eq!(config.api_key, "secret-key");
    }

    #[test]
    fn fails_on_missing_variable() {
        let err = ServiceConfig::from_lookup(|name| {
            if name == ENV_PROJECT_ID {
                None
            } else {
                full_lookup(name)
            }
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_PROJECT_ID));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let err = ServiceConfig::from_lookup(|name| {
            if name == ENV_API_KEY {
                Some(String::new())
            } else {
                full_lookup(name)
            }
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_API_KEY));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = ServiceConfig::from_lookup(full_lookup).unwrap();
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret-key"));
    }
}

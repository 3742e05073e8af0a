//! Runtime settings, read once from the environment at startup.

use log::{info, warn};
use std::{env, fmt::Display, str::FromStr, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// The script endpoint that stores, renders and mails certificates.
    pub remote_url: String,
    pub admin_password: String,
    /// Marks the session cookie `Secure`.
    pub production: bool,
    /// Applied to every remote call; an expired call counts as a failed row.
    pub request_timeout: Duration,
    /// Per multipart field.
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs: u64 = try_load(&lookup, "CERTIFY_REQUEST_TIMEOUT_SECS", "60")?;
        let max_upload_mb: usize = try_load(&lookup, "CERTIFY_MAX_UPLOAD_MB", "10")?;

        Ok(Self {
            host: try_load(&lookup, "CERTIFY_HOST", "127.0.0.1")?,
            port: try_load(&lookup, "CERTIFY_PORT", "8080")?,
            remote_url: required(&lookup, "CERTIFY_REMOTE_URL")?,
            admin_password: required(&lookup, "CERTIFY_ADMIN_PASSWORD")?,
            production: try_load(&lookup, "CERTIFY_PRODUCTION", "false")?,
            request_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }

    pub fn address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let config = Config::from_lookup(lookup(&[
            ("CERTIFY_REMOTE_URL", "https://script.example/exec"),
            ("CERTIFY_ADMIN_PASSWORD", "hunter2"),
        ]))
        .unwrap();

        assert_eq!(config.address(), ("127.0.0.1".to_string(), 8080));
        assert!(!config.production);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn missing_password_is_an_error() {
        let err = Config::from_lookup(lookup(&[(
            "CERTIFY_REMOTE_URL",
            "https://script.example/exec",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CERTIFY_ADMIN_PASSWORD")));
    }

    #[test]
    fn unparsable_port_is_reported() {
        let err = Config::from_lookup(lookup(&[
            ("CERTIFY_REMOTE_URL", "https://script.example/exec"),
            ("CERTIFY_ADMIN_PASSWORD", "hunter2"),
            ("CERTIFY_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "CERTIFY_PORT",
                ..
            }
        ));
    }
}

//! Startup configuration.
//!
//! Required settings are checked once at process startup; the binary refuses
//! to start when any are absent, listing every missing name at once.

use std::time::Duration;

use thiserror::Error;

/// Which store implementation backs the process.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process stores, for dev and tests.
    Memory,
    /// Postgres via `DATABASE_URL`.
    Postgres,
}

/// SMTP transport settings for the notification mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub url: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub bind_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub smtp: Option<SmtpConfig>,
    pub sweep_interval: Duration,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("invalid value for {name}: {message}")]
    Invalid { name: String, message: String },
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through a lookup function (tests inject a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store_backend = match get("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND".to_string(),
                    message: format!("expected memory or postgres, got {other}"),
                });
            }
        };

        let jwt_secret = get("JWT_SECRET");
        let database_url = get("DATABASE_URL");

        let mut missing = Vec::new();
        if jwt_secret.is_none() {
            missing.push("JWT_SECRET".to_string());
        }
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            missing.push("DATABASE_URL".to_string());
        }
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let smtp = match (get("SMTP_URL"), get("SMTP_FROM")) {
            (Some(url), Some(from)) => Some(SmtpConfig { url, from }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    name: "SMTP_FROM".to_string(),
                    message: "SMTP_URL is set but SMTP_FROM is not".to_string(),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid {
                    name: "SMTP_URL".to_string(),
                    message: "SMTP_FROM is set but SMTP_URL is not".to_string(),
                });
            }
        };

        let sweep_interval = match get("SWEEP_INTERVAL_SECS") {
            None => Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "SWEEP_INTERVAL_SECS".to_string(),
                    message: format!("expected seconds as an integer, got {raw}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: "SWEEP_INTERVAL_SECS".to_string(),
                        message: "interval must be at least one second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
        };

        Ok(Self {
            jwt_secret: jwt_secret.unwrap_or_default(),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            store_backend,
            database_url,
            redis_url: get("REDIS_URL"),
            smtp,
            sweep_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + '_ {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn refuses_to_start_without_required_settings() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        let ConfigError::Missing(names) = err else {
            panic!("expected Missing");
        };
        assert_eq!(names, vec!["JWT_SECRET", "DATABASE_URL"]);
    }

    #[test]
    fn memory_backend_needs_no_database_url() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("STORE_BACKEND", "memory"),
        ]))
        .unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn postgres_backend_reads_database_url() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "postgres://localhost/talentbridge"),
            ("SWEEP_INTERVAL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn smtp_settings_come_in_pairs() {
        let err = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("STORE_BACKEND", "memory"),
            ("SMTP_URL", "smtp://localhost:1025"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn unknown_backend_is_invalid() {
        let err = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("STORE_BACKEND", "sqlite"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}

//! Server configuration read from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use giftplanner_actors::{RestartPolicy, SupervisorConfig};

use crate::error::AppError;

/// Everything the binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// PostgreSQL connection string. `None` selects the in-memory event log.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    /// Longest a request waits for an actor reply.
    pub ask_timeout: Duration,
    /// Restarts allowed per actor within `restart_window`.
    pub max_restarts: u32,
    pub restart_window: Duration,
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = SupervisorConfig::default();
        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse(&lookup, "PORT", 3000)?,
            ask_timeout: Duration::from_millis(parse(
                &lookup,
                "ASK_TIMEOUT_MS",
                millis(defaults.ask_timeout),
            )?),
            max_restarts: parse(&lookup, "MAX_RESTARTS", defaults.restart_policy.max_restarts)?,
            restart_window: Duration::from_secs(parse(
                &lookup,
                "RESTART_WINDOW_SECS",
                defaults.restart_policy.within.as_secs(),
            )?),
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 10)?,
        })
    }

    /// Supervisor knobs derived from this configuration.
    #[must_use]
    pub fn supervisor_config(&self) -> SupervisorConfig {
        let defaults = SupervisorConfig::default();
        SupervisorConfig {
            ask_timeout: self.ask_timeout,
            restart_policy: RestartPolicy {
                max_restarts: self.max_restarts,
                within: self.restart_window,
                ..defaults.restart_policy
            },
            ..defaults
        }
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
        None => Ok(default),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

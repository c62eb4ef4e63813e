//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `ACCOUNTS_*` environment variables, and
//! configuration files, in increasing order of precedence for the former.

use std::net::SocketAddr;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings controlling the listener, storage, and token signing.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNTS")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// HMAC secret used to sign bearer tokens.
    pub token_secret: Option<String>,
    /// Token lifetime in seconds.
    #[ortho_config(default = 86_400)]
    pub token_ttl_secs: i64,
}

impl std::fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("db_max_connections", &self.db_max_connections)
            .field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// Settings that cannot be turned into a running server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address `{value}`: {message}")]
    BindAddr { value: String, message: String },
    #[error("token_ttl_secs must be positive, got {value}")]
    TokenTtl { value: i64 },
}

impl ServerSettings {
    /// Parsed listener address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::BindAddr {
                value: value.to_owned(),
                message: err.to_string(),
            }
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Configured token secret, ignoring blank values.
    pub fn token_secret(&self) -> Option<&str> {
        self.token_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
    }

    /// Token lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::TokenTtl`] for zero or negative values.
    pub fn token_ttl(&self) -> Result<TimeDelta, SettingsError> {
        if self.token_ttl_secs <= 0 {
            return Err(SettingsError::TokenTtl {
                value: self.token_ttl_secs,
            });
        }
        TimeDelta::try_seconds(self.token_ttl_secs).ok_or(SettingsError::TokenTtl {
            value: self.token_ttl_secs,
        })
    }
}

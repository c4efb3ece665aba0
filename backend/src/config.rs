//! Service settings loaded via OrthoConfig.
//!
//! Values layer from CLI flags, `CALC_*` environment variables and
//! configuration files. The database URL additionally falls back to the
//! conventional `DATABASE_URL` variable.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::outbound::persistence::PoolConfig;

/// Environment variable consulted when `database_url` is not configured.
pub const DATABASE_URL_FALLBACK: &str = "DATABASE_URL";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_TIMEOUT_SECS: u64 = 30;

/// Settings that could not be turned into a runnable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// Neither `CALC_DATABASE_URL` nor `DATABASE_URL` was set.
    #[error("database URL is not configured (set CALC_DATABASE_URL or DATABASE_URL)")]
    MissingDatabaseUrl,
    /// The bind address did not parse as `host:port`.
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr {
        /// Address as configured.
        value: String,
        /// Parser message.
        message: String,
    },
}

/// Runtime settings for the calculations service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CALC")]
pub struct ServiceSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// Maximum pooled connections.
    pub pool_max_size: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_timeout_secs: Option<u64>,
    /// Skip applying embedded migrations on start-up.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
}

impl ServiceSettings {
    /// Database URL from settings, else from `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when neither is set.
    pub fn database_url(&self) -> Result<String, SettingsError> {
        self.database_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| {
                std::env::var(DATABASE_URL_FALLBACK)
                    .ok()
                    .filter(|url| !url.trim().is_empty())
            })
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not
    /// parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            }
        })
    }

    /// Configured pool size.
    #[must_use]
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Configured pool checkout timeout.
    #[must_use]
    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_secs.unwrap_or(DEFAULT_POOL_TIMEOUT_SECS))
    }

    /// Pool configuration derived from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no URL is known.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(self.pool_max_size())
            .with_connection_timeout(self.pool_timeout()))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for service settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "CALC_DATABASE_URL",
        "CALC_BIND_ADDR",
        "CALC_POOL_MAX_SIZE",
        "CALC_POOL_TIMEOUT_SECS",
        "CALC_SKIP_MIGRATIONS",
        DATABASE_URL_FALLBACK,
    ];

    fn load_from_empty_args() -> ServiceSettings {
        ServiceSettings::load_from_iter([OsString::from("calc-api")])
            .expect("config should load")
    }

    fn cleared_except(
        overrides: &[(&'static str, &'static str)],
    ) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(cleared_except(&[]));

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Err(SettingsError::MissingDatabaseUrl));
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:8000".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.pool_max_size(), 10);
        assert_eq!(settings.pool_timeout(), Duration::from_secs(30));
        assert!(!settings.skip_migrations);
    }

    #[rstest]
    fn prefixed_environment_overrides_are_respected() {
        let _guard = lock_env(cleared_except(&[
            ("CALC_DATABASE_URL", "postgres://calc@db/calc"),
            ("CALC_BIND_ADDR", "127.0.0.1:9000"),
            ("CALC_POOL_MAX_SIZE", "4"),
            ("CALC_POOL_TIMEOUT_SECS", "5"),
            ("CALC_SKIP_MIGRATIONS", "true"),
        ]));

        let settings = load_from_empty_args();
        let pool = settings.pool_config().expect("url present");
        assert_eq!(pool.database_url(), "postgres://calc@db/calc");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(pool.connection_timeout(), Duration::from_secs(5));
        assert_eq!(
            settings.bind_addr().expect("parses"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.skip_migrations);
    }

    #[rstest]
    fn database_url_falls_back_to_conventional_variable() {
        let _guard = lock_env(cleared_except(&[(
            DATABASE_URL_FALLBACK,
            "postgres://fallback/calc",
        )]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url().as_deref(),
            Ok("postgres://fallback/calc")
        );
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env(cleared_except(&[("CALC_BIND_ADDR", "not-an-address")]));

        let settings = load_from_empty_args();
        let err = settings.bind_addr().expect_err("invalid address");
        assert!(matches!(
            err,
            SettingsError::InvalidBindAddr { ref value, .. } if value == "not-an-address"
        ));
    }
}

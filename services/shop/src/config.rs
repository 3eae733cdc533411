//! Service configuration
//!
//! Database and JWT settings load through their own `from_env`
//! constructors; this module covers the listener and admin bootstrap.

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;
use std::net::SocketAddr;

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load `SERVER_HOST` (default `0.0.0.0`) and `SERVER_PORT` (default `8080`)
    pub fn from_env() -> Result<Self> {
        let settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .add_source(Environment::with_prefix("SERVER").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}:{}: {}", self.host, self.port, e))
    }
}

/// Administrator account created at startup when it does not exist yet
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AdminBootstrap {
    /// Read `ADMIN_USERNAME`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`.
    ///
    /// Returns `None` unless all three are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Some(Self {
            username: var("ADMIN_USERNAME")?,
            email: var("ADMIN_EMAIL")?,
            password: var("ADMIN_PASSWORD")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn server_config_defaults() {
        unsafe {
            std::env::remove_var("SERVER_HOST");
            std::env::remove_var("SERVER_PORT");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    #[serial]
    fn server_config_from_env() {
        unsafe {
            std::env::set_var("SERVER_HOST", "127.0.0.1");
            std::env::set_var("SERVER_PORT", "3005");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3005);

        unsafe {
            std::env::remove_var("SERVER_HOST");
            std::env::remove_var("SERVER_PORT");
        }
    }

    #[test]
    #[serial]
    fn admin_bootstrap_needs_every_field() {
        unsafe {
            std::env::set_var("ADMIN_USERNAME", "admin");
            std::env::set_var("ADMIN_EMAIL", "admin@example.com");
            std::env::remove_var("ADMIN_PASSWORD");
        }
        assert!(AdminBootstrap::from_env().is_none());

        unsafe {
            std::env::set_var("ADMIN_PASSWORD", "changeme");
        }
        let admin = AdminBootstrap::from_env().unwrap();
        assert_eq!(admin.username, "admin");

        unsafe {
            std::env::remove_var("ADMIN_USERNAME");
            std::env::remove_var("ADMIN_EMAIL");
            std::env::remove_var("ADMIN_PASSWORD");
        }
    }
}

//! HTTP server configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Environment prefix of every server setting
const ENV_PREFIX: &str = "LIBRARY";

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the listener binds to
    pub bind_address: String,
    /// Upper bound of a single permission check, in milliseconds
    pub permission_check_timeout_ms: u64,
}

impl ServerConfig {
    /// Load the configuration from defaults overridden by the environment
    ///
    /// # Environment Variables
    /// - `LIBRARY_BIND_ADDRESS`: listen address (default: "0.0.0.0:8009")
    /// - `LIBRARY_PERMISSION_CHECK_TIMEOUT_MS`: permission check budget (default: 2000)
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .set_default("bind_address", "0.0.0.0:8009")?
            .set_default("permission_check_timeout_ms", 2000)?
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read server configuration")?;

        let server_config: ServerConfig = config
            .try_deserialize()
            .context("Invalid server configuration")?;

        if server_config.permission_check_timeout_ms == 0 {
            anyhow::bail!("LIBRARY_PERMISSION_CHECK_TIMEOUT_MS must be positive");
        }

        Ok(server_config)
    }

    /// Permission check budget
    pub fn permission_check_timeout(&self) -> Duration {
        Duration::from_millis(self.permission_check_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        unsafe {
            env::remove_var("LIBRARY_BIND_ADDRESS");
            env::remove_var("LIBRARY_PERMISSION_CHECK_TIMEOUT_MS");
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = ServerConfig::load().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8009");
        assert_eq!(config.permission_check_timeout(), Duration::from_secs(2));
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            env::set_var("LIBRARY_BIND_ADDRESS", "127.0.0.1:9000");
            env::set_var("LIBRARY_PERMISSION_CHECK_TIMEOUT_MS", "250");
        }

        let config = ServerConfig::load().unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.permission_check_timeout_ms, 250);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_timeout_is_rejected() {
        clear_env();
        unsafe {
            env::set_var("LIBRARY_PERMISSION_CHECK_TIMEOUT_MS", "0");
        }

        assert!(ServerConfig::load().is_err());

        clear_env();
    }
}

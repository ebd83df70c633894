//! Configuration for pciesim
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, SimError};

/// Main configuration for a simulator session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Pipe Configuration
    // -------------------------------------------------------------------------
    /// Named pipe the driver writes commands into
    pub cmd_pipe_path: PathBuf,

    /// Named pipe the driver reads responses from
    pub rsp_pipe_path: PathBuf,

    // -------------------------------------------------------------------------
    // Timeout Configuration
    // -------------------------------------------------------------------------
    /// Response budget for config/memory/link status operations
    pub default_timeout: Duration,

    /// Response budget for a system reset, which takes longer
    pub reset_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cmd_pipe_path: PathBuf::from("/tmp/pcie_sim_cmd"),
            rsp_pipe_path: PathBuf::from("/tmp/pcie_sim_rsp"),
            default_timeout: Duration::from_secs(5),
            reset_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config for values the driver cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.default_timeout.is_zero() || self.reset_timeout.is_zero() {
            return Err(SimError::Config("timeouts must be non-zero".to_string()));
        }
        if self.cmd_pipe_path == self.rsp_pipe_path {
            return Err(SimError::Config(format!(
                "command and response pipes must differ (both {})",
                self.cmd_pipe_path.display()
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the command pipe path
    pub fn cmd_pipe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cmd_pipe_path = path.into();
        self
    }

    /// Set the response pipe path
    pub fn rsp_pipe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.rsp_pipe_path = path.into();
        self
    }

    /// Set the timeout for ordinary operations
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    /// Set the timeout for system reset
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.config.reset_timeout = timeout;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

//! Configuration for respwire
//!
//! Centralized configuration with sensible defaults.

use crate::error::{RespError, Result};
use crate::protocol::DecodeLimits;

/// Main configuration for a client session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Server host name or IP address
    pub host: String,

    /// Server TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Connect Policy
    // -------------------------------------------------------------------------
    /// Number of connect attempts before giving up
    pub connect_attempts: u32,

    /// Pause between failed connect attempts (milliseconds, 0 = none)
    pub connect_retry_delay_ms: u64,

    /// Per-attempt connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Socket Configuration
    // -------------------------------------------------------------------------
    /// Disable Nagle's algorithm after connecting
    pub nodelay: bool,

    /// Read timeout (milliseconds, 0 = block indefinitely)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 = block indefinitely)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Decode Limits
    // -------------------------------------------------------------------------
    /// Largest bulk string accepted from the server (bytes)
    pub max_bulk_len: usize,

    /// Longest status, error, integer or length line accepted (bytes)
    pub max_line_len: usize,

    /// Largest array element count accepted from the server
    pub max_array_len: usize,

    /// Deepest array nesting accepted from the server
    pub max_nesting_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        let limits = DecodeLimits::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            connect_attempts: 10,
            connect_retry_delay_ms: 0,
            connect_timeout_ms: 0,
            nodelay: true,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            max_bulk_len: limits.max_bulk_len,
            max_line_len: limits.max_line_len,
            max_array_len: limits.max_array_len,
            max_nesting_depth: limits.max_depth,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` as used for logging and error messages
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the settings that would make a session unusable
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(RespError::Config("host must not be empty".to_string()));
        }
        if self.connect_attempts == 0 {
            return Err(RespError::Config(
                "connect_attempts must be at least 1".to_string(),
            ));
        }
        if self.max_bulk_len == 0 {
            return Err(RespError::Config(
                "max_bulk_len must be at least 1".to_string(),
            ));
        }
        if self.max_line_len == 0 {
            return Err(RespError::Config(
                "max_line_len must be at least 1".to_string(),
            ));
        }
        if self.max_nesting_depth == 0 {
            return Err(RespError::Config(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Decode limits derived from this config
    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_bulk_len: self.max_bulk_len,
            max_line_len: self.max_line_len,
            max_array_len: self.max_array_len,
            max_depth: self.max_nesting_depth,
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the number of connect attempts
    pub fn connect_attempts(mut self, attempts: u32) -> Self {
        self.config.connect_attempts = attempts;
        self
    }

    /// Set the pause between connect attempts (in milliseconds)
    pub fn connect_retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.connect_retry_delay_ms = ms;
        self
    }

    /// Set the per-attempt connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.config.nodelay = enabled;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the largest accepted bulk string (in bytes)
    pub fn max_bulk_len(mut self, len: usize) -> Self {
        self.config.max_bulk_len = len;
        self
    }

    /// Set the longest accepted reply line (in bytes)
    pub fn max_line_len(mut self, len: usize) -> Self {
        self.config.max_line_len = len;
        self
    }

    /// Set the largest accepted array length
    pub fn max_array_len(mut self, len: usize) -> Self {
        self.config.max_array_len = len;
        self
    }

    /// Set the deepest accepted array nesting
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.config.max_nesting_depth = depth;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

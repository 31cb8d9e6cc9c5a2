//! Session configuration.
//!
//! Every field has a default, so a JSON document only needs the keys it
//! wants to change:
//!
//! ```
//! use coordinator_client::session::SessionConfig;
//!
//! let config = SessionConfig::from_json(r#"{ "rpc_timeout_ms": 250 }"#).unwrap();
//! assert_eq!(config.rpc_timeout().map(|t| t.as_millis()), Some(250));
//! ```

use std::time::Duration;

use serde::Deserialize;

use super::frame::DEFAULT_MAX_FRAME_PAYLOAD;
use crate::error::{Error, Result};

/// Default time allowed for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Tunables for [`StreamSession`](super::StreamSession).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Connection establishment timeout, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-RPC timeout in milliseconds; `None` waits forever.
    pub rpc_timeout_ms: Option<u64>,
    /// Largest response frame accepted, in bytes.
    pub max_response_bytes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            rpc_timeout_ms: None,
            max_response_bytes: DEFAULT_MAX_FRAME_PAYLOAD,
        }
    }
}

impl SessionConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no session could honor.
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_ms == 0 {
            return Err(Error::Config("connect_timeout_ms must be positive".to_string()));
        }
        if self.rpc_timeout_ms == Some(0) {
            return Err(Error::Config("rpc_timeout_ms must be positive".to_string()));
        }
        if self.max_response_bytes == 0 {
            return Err(Error::Config("max_response_bytes must be positive".to_string()));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn rpc_timeout(&self) -> Option<Duration> {
        self.rpc_timeout_ms.map(Duration::from_millis)
    }

    /// Set the RPC timeout, rounded up to whole milliseconds.
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout_ms = Some(ceil_millis(timeout));
        self
    }

    /// Set the connect timeout, rounded up to whole milliseconds.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = ceil_millis(timeout);
        self
    }
}

/// Milliseconds in `d`, rounded up and never below 1.
fn ceil_millis(d: Duration) -> u64 {
    let millis = d.as_nanos().div_ceil(1_000_000).max(1);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

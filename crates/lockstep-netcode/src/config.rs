//! Netplay configuration
//!
//! Loaded as part of the frontend's RON configuration file; every field
//! has a default so partial files are accepted.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Settings for the network transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetplayConfig {
    /// Address the host binds to, or the client connects to
    pub addr: SocketAddr,
    /// Number of recent local inputs carried by every input packet
    pub redundancy: usize,
    /// Minimum time between re-sends while stalled, in milliseconds
    pub resend_interval_ms: u64,
    /// Capacity of the channel between the receiver thread and the synchronizer
    pub inbox_capacity: usize,
}

impl NetplayConfig {
    /// Check the configuration for values the transport cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.redundancy == 0 {
            return Err(crate::Error::InvalidConfig(
                "redundancy must be at least 1".to_string(),
            ));
        }
        if self.inbox_capacity == 0 {
            return Err(crate::Error::InvalidConfig(
                "inbox_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Minimum time between re-sends while stalled
    pub fn resend_interval(&self) -> Duration {
        Duration::from_millis(self.resend_interval_ms)
    }
}

impl Default for NetplayConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 55435)),
            redundancy: 8,
            resend_interval_ms: 50,
            inbox_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = NetplayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resend_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_partial_ron() {
        let config: NetplayConfig = ron::from_str(r#"(addr: "0.0.0.0:6000")"#).unwrap();
        assert_eq!(config.addr, "0.0.0.0:6000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.redundancy, 8);
    }

    #[test]
    fn test_rejects_zero_redundancy() {
        let config = NetplayConfig {
            redundancy: 0,
            ..NetplayConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

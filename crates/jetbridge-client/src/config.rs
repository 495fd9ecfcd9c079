//! Client configuration with validation.

use jetbridge_protocol::{PUBLIC_DOWNLINK_CHANNEL, PUBLIC_UPLINK_CHANNEL};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default wait for a response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Channel configuration
    pub channels: ChannelConfig,
    /// Wait applied by `request` when no timeout is given
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,
    /// How many identifiers to try when the generated one is still pending
    pub max_id_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            channels: ChannelConfig::default(),
            default_timeout: DEFAULT_TIMEOUT,
            max_id_attempts: 16,
        }
    }
}

impl ClientConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.downlink.is_empty() || self.channels.uplink.is_empty() {
            return Err(ConfigError::EmptyChannelName);
        }

        if self.channels.downlink == self.channels.uplink {
            return Err(ConfigError::SameChannel(self.channels.downlink.clone()));
        }

        if self.default_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "default timeout cannot be 0".into(),
            ));
        }

        if self.max_id_attempts == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_id_attempts cannot be 0".into(),
            ));
        }

        Ok(())
    }
}

/// Names of the two one-way channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Responses towards the client
    pub downlink: String,
    /// Commands towards the module
    pub uplink: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            downlink: PUBLIC_DOWNLINK_CHANNEL.to_string(),
            uplink: PUBLIC_UPLINK_CHANNEL.to_string(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("channel names cannot be empty")]
    EmptyChannelName,
    #[error("downlink and uplink both use channel {0}")]
    SameChannel(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}

//! # JetBridge Client
//!
//! Host-side request/response engine for talking to the JetBridge module
//! over a client-data transport.
//!
//! # Architecture
//!
//! ```text
//! caller ──request()──→ JetBridgeClient
//!                         │  1. next id            (IdGenerator)
//!                         │  2. register(id)       (PendingRequestTable)
//!                         │  3. encode + publish   (Packet → ChannelBinding → uplink)
//!                         │  4. wait(timeout)
//!                         ▼
//!                    ┌────────────────────┐
//!                    │ ClientDataTransport│  (port; BusTransport adapter)
//!                    └────────────────────┘
//!                         │ downlink delivery (receiver task)
//!                         ▼
//!                    decode → fulfill(id) → waiting caller wakes
//! ```
//!
//! A request that sees no matching response within its timeout resolves to
//! `Ok(None)`. Responses arriving after that are discarded.
//!
//! # Usage
//!
//! ```ignore
//! use jetbridge_client::{adapters::BusTransport, ClientConfig, JetBridgeClient};
//!
//! let transport = Arc::new(BusTransport::connect(&bus, "host"));
//! let client = JetBridgeClient::new(transport, ClientConfig::default())?;
//! client.connect()?;
//! let response = client.request("PING").await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod channel;
pub mod client;
pub mod config;
pub mod correlation;
pub mod error;
pub mod pending;
pub mod ports;

pub use channel::{BoundChannels, ChannelBinding};
pub use client::JetBridgeClient;
pub use config::{ChannelConfig, ClientConfig, ConfigError};
pub use correlation::IdGenerator;
pub use error::{ClientError, ClientResult, TransportError};
pub use pending::{PendingHandle, PendingRequestTable, PendingStats};
pub use ports::{ChannelHandle, ClientDataTransport, Delivery, DeliveryStream, LayoutId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

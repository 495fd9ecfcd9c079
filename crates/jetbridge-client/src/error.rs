//! Client error types.
//!
//! A timed-out request is not an error: it resolves to `Ok(None)`.

use crate::config::ConfigError;
use crate::ports::ChannelHandle;
use jetbridge_protocol::PacketId;
use thiserror::Error;

/// Failures reported by a client-data transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("layout registration failed: {0}")]
    Registration(String),

    #[error("channel binding failed: {0}")]
    Binding(String),

    #[error("subscription failed: {0}")]
    Subscription(String),

    #[error("publish on channel {channel} failed: {reason}")]
    Publish {
        channel: ChannelHandle,
        reason: String,
    },
}

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client is not connected")]
    NotConnected,

    #[error("client is already connected")]
    AlreadyConnected,

    #[error("connect requires a running tokio runtime")]
    NoRuntime,

    #[error("request id {0} is already pending")]
    DuplicateId(PacketId),

    #[error("no free request id after {attempts} attempts")]
    IdsExhausted { attempts: u32 },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

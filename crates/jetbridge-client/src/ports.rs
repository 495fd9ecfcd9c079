//! Outbound port towards the client-data transport.
//!
//! The transport delivers fixed-size buffers between named one-way channels.
//! It is not part of this crate; `adapters::BusTransport` binds the port to
//! the in-memory `client-data-bus`.

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Transport-assigned id of a registered data layout.
pub type LayoutId = u32;

/// Transport-assigned handle of a bound channel name.
pub type ChannelHandle = u32;

/// One inbound buffer delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Layout the buffer was delivered under.
    pub layout: LayoutId,
    /// Raw bytes.
    pub data: Bytes,
}

/// Stream of deliveries for one subscription. Ends when the transport closes.
pub type DeliveryStream = BoxStream<'static, Delivery>;

/// Operations the client needs from a client-data transport.
#[async_trait]
pub trait ClientDataTransport: Send + Sync {
    /// Register a fixed-size layout of `size` bytes.
    fn register_layout(&self, size: usize) -> Result<LayoutId, TransportError>;

    /// Bind a channel name to a local handle.
    fn bind_channel_name(&self, name: &str) -> Result<ChannelHandle, TransportError>;

    /// Subscribe to updates on `channel`.
    ///
    /// With `on_change_only`, writes that leave the bytes unchanged are not delivered.
    fn subscribe(
        &self,
        channel: ChannelHandle,
        layout: LayoutId,
        on_change_only: bool,
    ) -> Result<DeliveryStream, TransportError>;

    /// Write `data` to `channel`. No acknowledgment of remote receipt exists.
    async fn publish(
        &self,
        channel: ChannelHandle,
        layout: LayoutId,
        data: Bytes,
    ) -> Result<(), TransportError>;
}

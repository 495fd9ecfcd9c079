//! Channel Binding - the uplink/downlink pair over a client-data transport.
//!
//! `connect` registers the packet layout, binds both channel names and
//! subscribes to the downlink with on-change delivery. A background task
//! drains the subscription and hands each buffer of the packet layout to the
//! receive callback. `connect_manual` skips the task and returns the stream
//! to a host that pumps deliveries itself.

use crate::config::ChannelConfig;
use crate::error::{ClientError, ClientResult};
use crate::ports::{ChannelHandle, ClientDataTransport, DeliveryStream, LayoutId};
use bytes::Bytes;
use futures::StreamExt;
use jetbridge_protocol::PACKET_SIZE;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Handles obtained from the transport by `connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundChannels {
    /// Packet layout id.
    pub layout: LayoutId,
    /// Outbound channel.
    pub uplink: ChannelHandle,
    /// Inbound channel.
    pub downlink: ChannelHandle,
}

struct Connection {
    channels: BoundChannels,
    /// `None` when the host drains the downlink itself.
    receiver: Option<JoinHandle<()>>,
}

/// Uplink/downlink pair bound on a transport.
pub struct ChannelBinding {
    transport: Arc<dyn ClientDataTransport>,
    config: ChannelConfig,
    connection: Mutex<Option<Connection>>,
}

impl ChannelBinding {
    /// Create an unbound pair.
    pub fn new(transport: Arc<dyn ClientDataTransport>, config: ChannelConfig) -> Self {
        Self {
            transport,
            config,
            connection: Mutex::new(None),
        }
    }

    /// Bind both channels and start delivering downlink buffers to `on_receive`.
    ///
    /// Requires a tokio runtime for the receiver task and fails with
    /// [`ClientError::NoRuntime`] outside one. `on_receive` runs on the
    /// receiver task, concurrently with any caller of `publish`.
    pub fn connect<F>(&self, on_receive: F) -> ClientResult<BoundChannels>
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ClientError::NoRuntime)?;

        let mut connection = self.connection.lock();
        if connection.is_some() {
            return Err(ClientError::AlreadyConnected);
        }
        let (channels, mut deliveries) = self.bind()?;

        let layout = channels.layout;
        let receiver = runtime.spawn(async move {
            while let Some(delivery) = deliveries.next().await {
                if delivery.layout != layout {
                    trace!(layout = delivery.layout, "Ignoring delivery for foreign layout");
                    continue;
                }
                on_receive(&delivery.data);
            }
            warn!("Downlink delivery stream ended");
        });

        *connection = Some(Connection {
            channels,
            receiver: Some(receiver),
        });
        Ok(channels)
    }

    /// Bind both channels and hand the downlink stream to the caller.
    ///
    /// No task is spawned; the caller drains the stream and filters by
    /// layout itself.
    pub fn connect_manual(&self) -> ClientResult<(BoundChannels, DeliveryStream)> {
        let mut connection = self.connection.lock();
        if connection.is_some() {
            return Err(ClientError::AlreadyConnected);
        }
        let (channels, deliveries) = self.bind()?;
        *connection = Some(Connection {
            channels,
            receiver: None,
        });
        Ok((channels, deliveries))
    }

    fn bind(&self) -> ClientResult<(BoundChannels, DeliveryStream)> {
        let layout = self.transport.register_layout(PACKET_SIZE)?;
        let downlink = self.transport.bind_channel_name(&self.config.downlink)?;
        let uplink = self.transport.bind_channel_name(&self.config.uplink)?;
        let deliveries = self.transport.subscribe(downlink, layout, true)?;

        info!(
            uplink = %self.config.uplink,
            downlink = %self.config.downlink,
            layout,
            "Channels bound"
        );
        Ok((
            BoundChannels {
                layout,
                uplink,
                downlink,
            },
            deliveries,
        ))
    }

    /// Hand one encoded packet to the uplink.
    pub async fn publish(&self, packet: Bytes) -> ClientResult<()> {
        let channels = self.channels().ok_or(ClientError::NotConnected)?;
        self.transport
            .publish(channels.uplink, channels.layout, packet)
            .await?;
        trace!(uplink = channels.uplink, "Packet published");
        Ok(())
    }

    /// Stop the receiver task and forget the bound handles.
    pub fn disconnect(&self) {
        if let Some(connection) = self.connection.lock().take() {
            if let Some(receiver) = connection.receiver {
                receiver.abort();
            }
            debug!("Channels unbound");
        }
    }

    /// Bound handles, if connected.
    pub fn channels(&self) -> Option<BoundChannels> {
        self.connection.lock().as_ref().map(|c| c.channels)
    }

    /// Whether `connect` has succeeded.
    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }
}

impl Drop for ChannelBinding {
    fn drop(&mut self) {
        self.disconnect();
    }
}

//! Client-data bus adapter.
//!
//! Implements `ClientDataTransport` over a `client_data_bus::BusConnection`.
//! Layout and channel ids are allocated per adapter from a local sequence.

use crate::error::TransportError;
use crate::ports::{ChannelHandle, ClientDataTransport, Delivery, DeliveryStream, LayoutId};
use async_trait::async_trait;
use bytes::Bytes;
use client_data_bus::{BusConnection, ClientDataBus, DataRequestFlag};
use futures::StreamExt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Transport backed by a connection to the in-memory client-data bus.
pub struct BusTransport {
    connection: BusConnection,
    next_layout: AtomicU32,
    next_channel: AtomicU32,
}

impl BusTransport {
    /// Wrap an open connection.
    pub fn new(connection: BusConnection) -> Self {
        Self {
            connection,
            next_layout: AtomicU32::new(1),
            next_channel: AtomicU32::new(1),
        }
    }

    /// Open a connection named `client_name` on `bus` and wrap it.
    pub fn connect(bus: &Arc<ClientDataBus>, client_name: &str) -> Self {
        Self::new(bus.connect(client_name))
    }

    /// Underlying bus connection.
    pub fn connection(&self) -> &BusConnection {
        &self.connection
    }
}

#[async_trait]
impl ClientDataTransport for BusTransport {
    fn register_layout(&self, size: usize) -> Result<LayoutId, TransportError> {
        let layout = self.next_layout.fetch_add(1, Ordering::Relaxed);
        self.connection
            .add_to_definition(layout, size)
            .map_err(|e| TransportError::Registration(e.to_string()))?;
        Ok(layout)
    }

    fn bind_channel_name(&self, name: &str) -> Result<ChannelHandle, TransportError> {
        let channel = self.next_channel.fetch_add(1, Ordering::Relaxed);
        self.connection
            .map_name_to_id(name, channel)
            .map_err(|e| TransportError::Binding(e.to_string()))?;
        Ok(channel)
    }

    fn subscribe(
        &self,
        channel: ChannelHandle,
        layout: LayoutId,
        on_change_only: bool,
    ) -> Result<DeliveryStream, TransportError> {
        let flag = if on_change_only {
            DataRequestFlag::Changed
        } else {
            DataRequestFlag::Default
        };
        let subscription = self
            .connection
            .request_data(channel, layout, flag)
            .map_err(|e| TransportError::Subscription(e.to_string()))?;

        let stream = futures::stream::unfold(subscription, |mut subscription| async move {
            let data = subscription.recv().await?;
            Some((
                Delivery {
                    layout: data.definition,
                    data: data.data,
                },
                subscription,
            ))
        });
        Ok(stream.boxed())
    }

    async fn publish(
        &self,
        channel: ChannelHandle,
        layout: LayoutId,
        data: Bytes,
    ) -> Result<(), TransportError> {
        let receivers = self
            .connection
            .set_data(channel, layout, data)
            .map_err(|e| TransportError::Publish {
                channel,
                reason: e.to_string(),
            })?;

        if receivers == 0 {
            debug!(channel, "Published with no subscribers on the channel");
        }
        Ok(())
    }
}

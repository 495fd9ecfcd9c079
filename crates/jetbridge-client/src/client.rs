//! Client Façade.
//!
//! `JetBridgeClient` sends text commands on the uplink and resolves each call
//! with the downlink packet carrying the same identifier, or `None` once the
//! timeout elapses.

use crate::channel::{BoundChannels, ChannelBinding};
use crate::config::ClientConfig;
use crate::correlation::IdGenerator;
use crate::error::{ClientError, ClientResult};
use crate::pending::{PendingHandle, PendingRequestTable};
use crate::ports::{ClientDataTransport, DeliveryStream, LayoutId};
use jetbridge_protocol::{Opcode, Packet, PacketId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Request/response client over an uplink/downlink channel pair.
pub struct JetBridgeClient {
    binding: ChannelBinding,
    pending: Arc<PendingRequestTable>,
    ids: IdGenerator,
    config: ClientConfig,
}

impl JetBridgeClient {
    /// Create a client after validating `config`.
    pub fn new(transport: Arc<dyn ClientDataTransport>, config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        Ok(Self::with_ids(transport, config, IdGenerator::new()))
    }

    /// Create a client with an explicit identifier source.
    pub fn with_ids(
        transport: Arc<dyn ClientDataTransport>,
        config: ClientConfig,
        ids: IdGenerator,
    ) -> Self {
        Self {
            binding: ChannelBinding::new(transport, config.channels.clone()),
            pending: Arc::new(PendingRequestTable::new()),
            ids,
            config,
        }
    }

    /// Bind the channels and route downlink packets to pending requests.
    ///
    /// Spawns the receiver task on the current tokio runtime; outside a
    /// runtime this fails with [`ClientError::NoRuntime`].
    pub fn connect(&self) -> ClientResult<BoundChannels> {
        let pending = Arc::clone(&self.pending);
        self.binding.connect(move |bytes| {
            dispatch(&pending, bytes);
        })
    }

    /// Unbind the channels. Requests already waiting run into their timeout.
    pub fn disconnect(&self) {
        self.binding.disconnect();
    }

    /// Bind the channels without a receiver task.
    ///
    /// The host drains the returned stream and passes each delivery to
    /// [`handle_delivery`](Self::handle_delivery).
    pub fn connect_manual(&self) -> ClientResult<(BoundChannels, DeliveryStream)> {
        self.binding.connect_manual()
    }

    /// Forward a delivery received through a host-owned dispatch loop.
    ///
    /// Used together with [`connect_manual`](Self::connect_manual).
    /// Deliveries for other layouts are ignored. Returns whether a pending
    /// request was fulfilled.
    pub fn handle_delivery(&self, layout: LayoutId, data: &[u8]) -> bool {
        match self.binding.channels() {
            Some(channels) if channels.layout == layout => dispatch(&self.pending, data),
            _ => false,
        }
    }

    /// Send `command` and wait up to the configured default timeout.
    pub async fn request(&self, command: &str) -> ClientResult<Option<String>> {
        self.request_with_timeout(command, self.config.default_timeout)
            .await
    }

    /// Send `command` and wait up to `timeout` for the response text.
    ///
    /// Commands longer than the payload bound are truncated. `Ok(None)` means
    /// no response arrived in time.
    pub async fn request_with_timeout(
        &self,
        command: &str,
        timeout: Duration,
    ) -> ClientResult<Option<String>> {
        let response = self
            .request_packet(|id| Packet::new(id, command), timeout)
            .await?;
        Ok(response.map(|packet| packet.text()))
    }

    /// Send the packet built by `build` for a fresh id and wait for its response.
    pub async fn request_packet<F>(&self, build: F, timeout: Duration) -> ClientResult<Option<Packet>>
    where
        F: FnOnce(PacketId) -> Packet,
    {
        let handle = self.register_next()?;
        let id = handle.id();
        let mut packet = build(id);
        if packet.id() != id {
            packet = Packet::from_raw(id, *packet.data());
        }

        // The handle's drop releases the slot if publishing fails.
        self.binding.publish(packet.to_bytes()).await?;
        debug!(id = %id, "Request sent");

        Ok(handle.wait(timeout).await)
    }

    /// Run calculator code on the module. Returns whether it acknowledged.
    pub async fn execute_calculator_code(&self, code: &str) -> ClientResult<bool> {
        let response = self
            .request_packet(
                |id| Packet::command(id, Opcode::ExecuteCalculatorCode, code),
                self.config.default_timeout,
            )
            .await?;
        Ok(response.is_some())
    }

    /// Read a named variable from the module.
    pub async fn get_named_variable(&self, name: &str) -> ClientResult<Option<f64>> {
        let response = self
            .request_packet(
                |id| Packet::command(id, Opcode::GetNamedVariable, name),
                self.config.default_timeout,
            )
            .await?;
        Ok(response.map(|packet| packet.as_f64()))
    }

    /// Pending request table of this client.
    pub fn pending(&self) -> &PendingRequestTable {
        &self.pending
    }

    /// Number of requests currently waiting.
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }

    /// Whether the channels are bound.
    pub fn is_connected(&self) -> bool {
        self.binding.is_connected()
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn register_next(&self) -> ClientResult<PendingHandle> {
        for _ in 0..self.config.max_id_attempts {
            match self.pending.register(self.ids.next_id()) {
                Err(ClientError::DuplicateId(id)) => {
                    warn!(id = %id, "Generated id still pending, drawing another");
                }
                registered => return registered,
            }
        }
        Err(ClientError::IdsExhausted {
            attempts: self.config.max_id_attempts,
        })
    }
}

/// Decode one downlink buffer and fulfil the matching request.
fn dispatch(pending: &PendingRequestTable, data: &[u8]) -> bool {
    pending.fulfill(Packet::from_slice(data))
}

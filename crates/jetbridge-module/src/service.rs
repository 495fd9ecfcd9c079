//! Module service: the remote end of the bridge.
//!
//! Creates both client-data areas, listens to the uplink on change and
//! writes each handler response to the downlink.

use crate::handler::RequestHandler;
use client_data_bus::{BusConnection, BusError, ClientDataBus, DataRequestFlag, Subscription};
use jetbridge_protocol::{
    Packet, PACKET_DEFINITION, PACKET_SIZE, PUBLIC_DOWNLINK_AREA, PUBLIC_DOWNLINK_CHANNEL,
    PUBLIC_UPLINK_AREA, PUBLIC_UPLINK_CHANNEL,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Connection name the module registers on the bus.
pub const MODULE_CLIENT_NAME: &str = "JetBridge Module";

/// Errors raised while starting the module.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("client data setup failed: {0}")]
    Setup(#[from] BusError),
}

/// Counters for the module loop
#[derive(Debug, Default)]
pub struct ModuleStats {
    /// Uplink packets received
    pub received: AtomicU64,
    /// Responses written to the downlink
    pub answered: AtomicU64,
    /// Responses the bus refused
    pub failed: AtomicU64,
}

/// Starts the module loop.
pub struct ModuleService;

impl ModuleService {
    /// Set up the areas on `bus` and spawn the serving task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        bus: &Arc<ClientDataBus>,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<ModuleHandle, ModuleError> {
        let connection = bus.connect(MODULE_CLIENT_NAME);
        connection.add_to_definition(PACKET_DEFINITION, PACKET_SIZE)?;
        connection.map_name_to_id(PUBLIC_DOWNLINK_CHANNEL, PUBLIC_DOWNLINK_AREA)?;
        connection.map_name_to_id(PUBLIC_UPLINK_CHANNEL, PUBLIC_UPLINK_AREA)?;
        connection.create_area(PUBLIC_DOWNLINK_AREA, PACKET_SIZE)?;
        connection.create_area(PUBLIC_UPLINK_AREA, PACKET_SIZE)?;
        let uplink = connection.request_data(
            PUBLIC_UPLINK_AREA,
            PACKET_DEFINITION,
            DataRequestFlag::Changed,
        )?;

        let stats = Arc::new(ModuleStats::default());
        let task = tokio::spawn(serve(connection, uplink, handler, Arc::clone(&stats)));

        info!(client = MODULE_CLIENT_NAME, "Module started");
        Ok(ModuleHandle { task, stats })
    }
}

async fn serve(
    connection: BusConnection,
    mut uplink: Subscription,
    handler: Arc<dyn RequestHandler>,
    stats: Arc<ModuleStats>,
) {
    while let Some(data) = uplink.recv().await {
        stats.received.fetch_add(1, Ordering::Relaxed);
        let request = Packet::from_slice(&data.data);

        let Some(response) = handler.handle(&request) else {
            debug!(id = %request.id(), "No response for request");
            continue;
        };

        // Responses always answer the request's id.
        let response = if response.id() == request.id() {
            response
        } else {
            warn!(
                request = %request.id(),
                response = %response.id(),
                "Handler changed the response id, restoring it"
            );
            Packet::from_raw(request.id(), *response.data())
        };

        match connection.set_data(PUBLIC_DOWNLINK_AREA, PACKET_DEFINITION, response.to_bytes()) {
            Ok(_) => {
                stats.answered.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(id = %request.id(), error = %e, "Failed to write response");
            }
        }
    }
    info!("Uplink closed, module stopping");
}

/// Running module.
pub struct ModuleHandle {
    task: JoinHandle<()>,
    stats: Arc<ModuleStats>,
}

impl ModuleHandle {
    /// Loop counters.
    pub fn stats(&self) -> &ModuleStats {
        &self.stats
    }

    /// Stop serving.
    pub fn shutdown(self) {
        self.task.abort();
        info!(client = MODULE_CLIENT_NAME, "Module shut down");
    }
}

//! Shared setup for the integration flows.

use bytes::Bytes;
use client_data_bus::{BusConnection, ClientDataBus, DataRequestFlag, Subscription};
use jetbridge_client::adapters::BusTransport;
use jetbridge_client::{ClientConfig, IdGenerator, JetBridgeClient};
use jetbridge_protocol::{Packet, PACKET_SIZE, PUBLIC_DOWNLINK_CHANNEL, PUBLIC_UPLINK_CHANNEL};
use std::sync::Arc;
use std::time::Duration;

const DEFINITION: u32 = 1;
const DOWNLINK: u32 = 1;
const UPLINK: u32 = 2;

/// Fresh bus with test tracing installed.
pub fn bus() -> Arc<ClientDataBus> {
    jetbridge_telemetry::init_test_tracing();
    Arc::new(ClientDataBus::new())
}

/// Connected client whose ids start at `first_id`.
pub fn connected_client(bus: &Arc<ClientDataBus>, first_id: i32) -> Arc<JetBridgeClient> {
    let client = JetBridgeClient::with_ids(
        Arc::new(BusTransport::connect(bus, "host")),
        ClientConfig::default(),
        IdGenerator::starting_at(first_id),
    );
    client.connect().expect("client connects");
    Arc::new(client)
}

/// Remote end driven by the test: reads uplink packets and answers on demand.
pub struct ManualRemote {
    connection: BusConnection,
    uplink: Subscription,
}

impl ManualRemote {
    pub fn attach(bus: &Arc<ClientDataBus>) -> Self {
        let connection = bus.connect("manual remote");
        connection
            .add_to_definition(DEFINITION, PACKET_SIZE)
            .expect("definition");
        connection
            .map_name_to_id(PUBLIC_DOWNLINK_CHANNEL, DOWNLINK)
            .expect("downlink name");
        connection
            .map_name_to_id(PUBLIC_UPLINK_CHANNEL, UPLINK)
            .expect("uplink name");
        connection.create_area(DOWNLINK, PACKET_SIZE).expect("downlink area");
        connection.create_area(UPLINK, PACKET_SIZE).expect("uplink area");
        let uplink = connection
            .request_data(UPLINK, DEFINITION, DataRequestFlag::Changed)
            .expect("uplink subscription");
        Self { connection, uplink }
    }

    /// Next command packet written by the client.
    pub async fn next_request(&mut self) -> Packet {
        let data = tokio::time::timeout(Duration::from_secs(1), self.uplink.recv())
            .await
            .expect("request within 1s")
            .expect("uplink open");
        Packet::from_slice(&data.data)
    }

    /// Write `packet` to the downlink.
    pub fn respond(&self, packet: Packet) {
        self.write_raw(packet.to_bytes());
    }

    pub fn write_raw(&self, data: Bytes) {
        self.connection
            .set_data(DOWNLINK, DEFINITION, data)
            .expect("downlink write");
    }
}

/// Spin until `client` has `count` requests registered.
pub async fn wait_for_pending(client: &JetBridgeClient, count: usize) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while client.pending_count() < count {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("requests registered");
}

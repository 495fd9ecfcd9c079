//! # JetBridge Protocol
//!
//! Wire definitions shared by the host-side client and the remote module.
//!
//! ## Packet Layout
//!
//! ```text
//! ┌────────────┬──────────────────────────────────────────────┐
//! │ 0..4       │ 4..132                                       │
//! │ id (i32 LE)│ payload (128 bytes, zero-filled)             │
//! └────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Commands travel on the uplink channel, responses come back on the downlink
//! channel carrying the identifier of the command they answer.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod opcode;
pub mod packet;

pub use opcode::Opcode;
pub use packet::{Packet, PacketId};

/// Payload bound in bytes.
pub const PACKET_DATA_SIZE: usize = 128;

/// Size of the identifier field on the wire.
pub const PACKET_ID_SIZE: usize = 4;

/// Total encoded packet size.
pub const PACKET_SIZE: usize = PACKET_ID_SIZE + PACKET_DATA_SIZE;

/// Byte used to pad the payload up to the bound.
pub const FILLER: u8 = 0;

/// Channel carrying responses from the module to the client.
pub const PUBLIC_DOWNLINK_CHANNEL: &str = "theomessin.jetbridge.downlink";

/// Channel carrying commands from the client to the module.
pub const PUBLIC_UPLINK_CHANNEL: &str = "theomessin.jetbridge.uplink";

/// Client-data definition id for the packet layout.
pub const PACKET_DEFINITION: u32 = 5321;

/// Client-data area bound to the downlink channel.
pub const PUBLIC_DOWNLINK_AREA: u32 = 5321;

/// Client-data area bound to the uplink channel.
pub const PUBLIC_UPLINK_AREA: u32 = 5322;

//! # JetBridge Module
//!
//! Remote end of the bridge. It owns the uplink and downlink client-data
//! areas, reads each command packet from the uplink, and writes the
//! handler's response to the downlink under the same identifier.
//!
//! Binary commands carry an [`jetbridge_protocol::Opcode`] in their first
//! payload byte and are served by [`OpcodeHandler`]; plain text commands can
//! be served by any closure implementing [`RequestHandler`].

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod handler;
pub mod service;

pub use handler::{CalculatorBackend, MemoryBackend, OpcodeHandler, RequestHandler};
pub use service::{ModuleError, ModuleHandle, ModuleService, ModuleStats, MODULE_CLIENT_NAME};

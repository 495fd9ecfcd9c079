//! Adapters binding the client's ports to concrete transports.

pub mod bus_adapter;

pub use bus_adapter::BusTransport;

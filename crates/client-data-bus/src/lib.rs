//! # Client Data Bus
//!
//! In-memory stand-in for a simulator client-data transport.
//!
//! Named areas hold the last value written to them. Each connection maps
//! area names and data definitions to its own numeric ids, writes with
//! `set_data`, and receives updates through `request_data` subscriptions.
//!
//! ```text
//! ┌──────────────┐   set_data(uplink)    ┌──────────────┐
//! │    Client    │ ────────────────────→ │    Module    │
//! │  connection  │ ←──────────────────── │  connection  │
//! └──────────────┘   set_data(downlink)  └──────────────┘
//!                  ╲                    ╱
//!                   ┌──────────────────┐
//!                   │  ClientDataBus   │
//!                   │  named areas     │
//!                   └──────────────────┘
//! ```
//!
//! ## Change-Triggered Delivery
//!
//! Every write is broadcast to the area's subscribers tagged with whether
//! the bytes differ from the previous value. Subscriptions requested with
//! [`DataRequestFlag::Changed`] only see writes that changed the area.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bus;
pub mod error;
pub mod subscriber;

pub use bus::{BusConnection, ClientDataBus};
pub use error::BusError;
pub use subscriber::{ClientData, DataRequestFlag, Subscription};

/// Connection-local identifier of a client-data area.
pub type AreaId = u32;

/// Connection-local identifier of a data definition.
pub type DefinitionId = u32;

/// Updates buffered per area before slow subscribers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

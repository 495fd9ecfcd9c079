//! Request identifier generation.
//!
//! Identifiers come from a wrapping counter seeded at random, so ids are
//! distinct until the 32-bit space wraps while two clients sharing a bus
//! are unlikely to start on the same value.

use jetbridge_protocol::PacketId;
use std::sync::atomic::{AtomicI32, Ordering};

/// Source of request identifiers.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicI32,
}

impl IdGenerator {
    /// Counter starting at a random value.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(rand::random())
    }

    /// Counter starting at `first`.
    #[must_use]
    pub fn starting_at(first: i32) -> Self {
        Self {
            next: AtomicI32::new(first),
        }
    }

    /// Next identifier. `fetch_add` wraps on overflow.
    pub fn next_id(&self) -> PacketId {
        PacketId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

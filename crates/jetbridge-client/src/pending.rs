//! Pending Request Table - correlates downlink packets with waiting callers.
//!
//! Flow:
//! 1. Caller picks an id and calls `register()` to get a `PendingHandle`
//! 2. Caller publishes the command packet with that id
//! 3. The receive handler decodes a downlink packet and calls `fulfill()`
//! 4. Caller awaits `PendingHandle::wait()` until fulfilled or timed out
//!
//! Only the waiter removes an entry, through the handle's `Drop`. `fulfill`
//! takes the slot's sender but leaves the entry in place, so a second
//! delivery for the same id finds an empty slot and is ignored.

use crate::error::{ClientError, ClientResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jetbridge_protocol::{Packet, PacketId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// One in-flight request.
struct Slot {
    /// Taken by the first fulfilment.
    sender: Option<oneshot::Sender<Packet>>,
    created_at: Instant,
}

/// Counters for the pending request table
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Requests registered
    pub total_registered: AtomicU64,
    /// Requests that received their response
    pub total_completed: AtomicU64,
    /// Requests whose wait expired
    pub total_timeouts: AtomicU64,
    /// Deliveries with no live waiter (unknown id, expired, or duplicate)
    pub total_stale: AtomicU64,
}

/// Thread-safe map from request id to its response slot.
#[derive(Default)]
pub struct PendingRequestTable {
    pending: DashMap<PacketId, Slot>,
    stats: PendingStats,
}

impl PendingRequestTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an unfulfilled slot for `id`.
    ///
    /// Fails with [`ClientError::DuplicateId`] when `id` is already pending.
    pub fn register(self: &Arc<Self>, id: PacketId) -> ClientResult<PendingHandle> {
        let (tx, rx) = oneshot::channel();

        match self.pending.entry(id) {
            Entry::Occupied(_) => return Err(ClientError::DuplicateId(id)),
            Entry::Vacant(vacant) => {
                vacant.insert(Slot {
                    sender: Some(tx),
                    created_at: Instant::now(),
                });
            }
        }
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
        trace!(id = %id, "Registered pending request");

        Ok(PendingHandle {
            id,
            receiver: Some(rx),
            table: Arc::clone(self),
        })
    }

    /// Hand `packet` to the waiter registered under its id.
    ///
    /// Returns `false` without side effects on other requests when there is
    /// no live waiter for the id.
    pub fn fulfill(&self, packet: Packet) -> bool {
        let id = packet.id();
        let taken = self
            .pending
            .get_mut(&id)
            .and_then(|mut slot| slot.sender.take().map(|tx| (tx, slot.created_at)));

        let Some((sender, created_at)) = taken else {
            self.stats.total_stale.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Discarding packet with no pending request");
            return false;
        };

        if sender.send(packet).is_err() {
            // Waiter gave up between lookup and send.
            self.stats.total_stale.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Waiter gone before fulfilment");
            return false;
        }

        self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
        debug!(
            id = %id,
            response_time_us = created_at.elapsed().as_micros() as u64,
            "Fulfilled pending request"
        );
        true
    }

    /// Number of registered entries.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether `id` currently has an entry.
    pub fn is_pending(&self, id: PacketId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Table counters.
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }

    fn remove(&self, id: PacketId) {
        if self.pending.remove(&id).is_some() {
            trace!(id = %id, "Removed pending request");
        }
    }
}

/// Waiter side of a registered request.
///
/// Dropping the handle removes its entry from the table, whether the wait
/// succeeded, timed out, or the future was cancelled.
pub struct PendingHandle {
    id: PacketId,
    receiver: Option<oneshot::Receiver<Packet>>,
    table: Arc<PendingRequestTable>,
}

impl PendingHandle {
    /// Identifier this handle waits on.
    pub fn id(&self) -> PacketId {
        self.id
    }

    /// Wait for the response or until `timeout` elapses.
    pub async fn wait(mut self, timeout: Duration) -> Option<Packet> {
        let receiver = self.receiver.take()?;

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(packet)) => Some(packet),
            Ok(Err(_)) => None,
            Err(_) => {
                self.table
                    .stats
                    .total_timeouts
                    .fetch_add(1, Ordering::Relaxed);
                debug!(
                    id = %self.id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Pending request timed out"
                );
                None
            }
        }
    }
}

impl Drop for PendingHandle {
    fn drop(&mut self) {
        self.table.remove(self.id);
    }
}

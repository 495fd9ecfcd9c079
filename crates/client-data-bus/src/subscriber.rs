//! # Area Subscriptions
//!
//! Receiving side of the bus.

use crate::{AreaId, DefinitionId};
use bytes::Bytes;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Delivery filter requested with a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRequestFlag {
    /// Deliver every write, even when the bytes did not change.
    Default,
    /// Deliver only writes that changed the area's bytes.
    Changed,
}

/// One write broadcast to an area's subscribers.
#[derive(Debug, Clone)]
pub(crate) struct AreaUpdate {
    pub(crate) data: Bytes,
    pub(crate) changed: bool,
}

/// Data delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientData {
    /// Area the data was written to, in the subscriber's id space.
    pub area: AreaId,
    /// Definition the subscription was requested with.
    pub definition: DefinitionId,
    /// Raw bytes as written.
    pub data: Bytes,
}

/// A subscription handle for receiving area updates.
///
/// Dropping it unsubscribes.
pub struct Subscription {
    receiver: broadcast::Receiver<AreaUpdate>,
    area: AreaId,
    area_name: String,
    definition: DefinitionId,
    flag: DataRequestFlag,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<AreaUpdate>,
        area: AreaId,
        area_name: String,
        definition: DefinitionId,
        flag: DataRequestFlag,
    ) -> Self {
        Self {
            receiver,
            area,
            area_name,
            definition,
            flag,
        }
    }

    /// Receive the next update that passes the subscription's flag.
    ///
    /// Returns `None` once the bus side of the area is gone.
    pub async fn recv(&mut self) -> Option<ClientData> {
        loop {
            let update = match self.receiver.recv().await {
                Ok(u) => u,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(
                        area = %self.area_name,
                        lagged = count,
                        "Subscriber lagged, some updates dropped"
                    );
                    continue;
                }
            };

            if let Some(data) = self.accept(update) {
                return Some(data);
            }
        }
    }

    /// Try to receive the next update without waiting.
    ///
    /// `Ok(None)` means nothing is queued; `Err(())` means the area is gone.
    #[allow(clippy::result_unit_err)]
    pub fn try_recv(&mut self) -> Result<Option<ClientData>, ()> {
        loop {
            let update = match self.receiver.try_recv() {
                Ok(u) => u,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(()),
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(
                        area = %self.area_name,
                        lagged = count,
                        "Subscriber lagged, some updates dropped"
                    );
                    continue;
                }
            };

            if let Some(data) = self.accept(update) {
                return Ok(Some(data));
            }
        }
    }

    /// Area id this subscription listens on.
    #[must_use]
    pub fn area(&self) -> AreaId {
        self.area
    }

    /// Delivery flag of this subscription.
    #[must_use]
    pub fn flag(&self) -> DataRequestFlag {
        self.flag
    }

    fn accept(&self, update: AreaUpdate) -> Option<ClientData> {
        if self.flag == DataRequestFlag::Changed && !update.changed {
            return None;
        }
        Some(ClientData {
            area: self.area,
            definition: self.definition,
            data: update.data,
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(area = %self.area_name, "Subscription dropped");
    }
}

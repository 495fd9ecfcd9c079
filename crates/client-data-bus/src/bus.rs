//! # Bus and Connections
//!
//! `ClientDataBus` owns the named areas; `BusConnection` is one client's
//! view of them with its own definition and area id spaces.

use crate::error::BusError;
use crate::subscriber::{AreaUpdate, DataRequestFlag, Subscription};
use crate::{AreaId, DefinitionId, DEFAULT_CHANNEL_CAPACITY};
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// A named block of client data.
struct Area {
    name: String,
    size: RwLock<Option<usize>>,
    /// Last written bytes. Held while broadcasting so updates stay ordered.
    current: Mutex<Option<Bytes>>,
    sender: broadcast::Sender<AreaUpdate>,
}

impl Area {
    fn new(name: &str, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            name: name.to_string(),
            size: RwLock::new(None),
            current: Mutex::new(None),
            sender,
        }
    }
}

/// Shared in-memory client-data bus.
pub struct ClientDataBus {
    areas: RwLock<HashMap<String, Arc<Area>>>,
    updates_published: AtomicU64,
    capacity: usize,
}

impl ClientDataBus {
    /// Create a bus with the default per-area capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with the given per-area capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            areas: RwLock::new(HashMap::new()),
            updates_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Open a connection for `client_name`.
    #[must_use]
    pub fn connect(self: &Arc<Self>, client_name: &str) -> BusConnection {
        debug!(client = client_name, "Client data connection opened");
        BusConnection {
            bus: Arc::clone(self),
            client_name: client_name.to_string(),
            definitions: RwLock::new(HashMap::new()),
            areas: RwLock::new(HashMap::new()),
        }
    }

    /// Number of named areas known to the bus.
    #[must_use]
    pub fn area_count(&self) -> usize {
        self.areas.read().len()
    }

    /// Total writes accepted by the bus.
    #[must_use]
    pub fn updates_published(&self) -> u64 {
        self.updates_published.load(Ordering::Relaxed)
    }

    /// Per-area broadcast capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn area(&self, name: &str) -> Arc<Area> {
        if let Some(area) = self.areas.read().get(name) {
            return Arc::clone(area);
        }
        let mut areas = self.areas.write();
        Arc::clone(
            areas
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Area::new(name, self.capacity))),
        )
    }
}

impl Default for ClientDataBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One client's connection to the bus.
pub struct BusConnection {
    bus: Arc<ClientDataBus>,
    client_name: String,
    definitions: RwLock<HashMap<DefinitionId, usize>>,
    areas: RwLock<HashMap<AreaId, Arc<Area>>>,
}

impl BusConnection {
    /// Register a data definition of `size` bytes.
    pub fn add_to_definition(&self, definition: DefinitionId, size: usize) -> Result<(), BusError> {
        if size == 0 {
            return Err(BusError::EmptyDefinition);
        }
        let mut definitions = self.definitions.write();
        if definitions.contains_key(&definition) {
            return Err(BusError::DuplicateDefinition(definition));
        }
        definitions.insert(definition, size);
        debug!(client = %self.client_name, definition, size, "Definition registered");
        Ok(())
    }

    /// Bind `name` to the connection-local `area` id.
    ///
    /// Mapping the same name to the same id again is a no-op.
    pub fn map_name_to_id(&self, name: &str, area: AreaId) -> Result<(), BusError> {
        let mut areas = self.areas.write();
        if let Some(existing) = areas.get(&area) {
            if existing.name == name {
                return Ok(());
            }
            return Err(BusError::AreaIdInUse {
                id: area,
                existing: existing.name.clone(),
            });
        }
        areas.insert(area, self.bus.area(name));
        debug!(client = %self.client_name, area, name, "Area name mapped");
        Ok(())
    }

    /// Fix the size of a mapped area.
    pub fn create_area(&self, area: AreaId, size: usize) -> Result<(), BusError> {
        let area = self.mapped(area)?;
        let mut current = area.size.write();
        match *current {
            Some(existing) if existing != size => Err(BusError::AreaSizeMismatch {
                name: area.name.clone(),
                existing,
                requested: size,
            }),
            _ => {
                *current = Some(size);
                Ok(())
            }
        }
    }

    /// Subscribe to writes on `area`, delivered under `definition`.
    pub fn request_data(
        &self,
        area: AreaId,
        definition: DefinitionId,
        flag: DataRequestFlag,
    ) -> Result<Subscription, BusError> {
        self.definition_size(definition)?;
        let mapped = self.mapped(area)?;
        debug!(
            client = %self.client_name,
            area = %mapped.name,
            ?flag,
            "Client data requested"
        );
        Ok(Subscription::new(
            mapped.sender.subscribe(),
            area,
            mapped.name.clone(),
            definition,
            flag,
        ))
    }

    /// Write `data` to `area` using `definition`'s layout.
    ///
    /// Returns the number of subscribers the update was broadcast to.
    pub fn set_data(
        &self,
        area: AreaId,
        definition: DefinitionId,
        data: Bytes,
    ) -> Result<usize, BusError> {
        let expected = self.definition_size(definition)?;
        if data.len() != expected {
            return Err(BusError::DataSizeMismatch {
                definition,
                expected,
                actual: data.len(),
            });
        }
        let mapped = self.mapped(area)?;
        if let Some(size) = *mapped.size.read() {
            if size != expected {
                return Err(BusError::AreaSizeMismatch {
                    name: mapped.name.clone(),
                    existing: size,
                    requested: expected,
                });
            }
        }

        let mut current = mapped.current.lock();
        let changed = current.as_ref() != Some(&data);
        *current = Some(data.clone());
        self.bus.updates_published.fetch_add(1, Ordering::Relaxed);

        // No subscribers is not an error: the value is still stored.
        let receivers = mapped
            .sender
            .send(AreaUpdate { data, changed })
            .unwrap_or(0);
        trace!(
            client = %self.client_name,
            area = %mapped.name,
            changed,
            receivers,
            "Client data set"
        );
        Ok(receivers)
    }

    /// Last bytes written to `area`, if any.
    pub fn current_data(&self, area: AreaId) -> Result<Option<Bytes>, BusError> {
        Ok(self.mapped(area)?.current.lock().clone())
    }

    /// Name this connection was opened with.
    #[must_use]
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    fn mapped(&self, area: AreaId) -> Result<Arc<Area>, BusError> {
        self.areas
            .read()
            .get(&area)
            .cloned()
            .ok_or(BusError::UnknownArea(area))
    }

    fn definition_size(&self, definition: DefinitionId) -> Result<usize, BusError> {
        self.definitions
            .read()
            .get(&definition)
            .copied()
            .ok_or(BusError::UnknownDefinition(definition))
    }
}

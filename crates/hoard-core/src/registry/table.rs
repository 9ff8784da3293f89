use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::codec::encode_store;
use crate::persistence::{SnapshotSource, UnitId, UnitRecord};
use crate::registry::error::RegistryError;
use crate::registry::unit::{Location, StorageUnit};

/// A unit shared between the registry and the save path
pub type SharedUnit = Arc<Mutex<StorageUnit>>;

#[derive(Debug, Default)]
struct Index {
    units: HashMap<UnitId, SharedUnit>,
    by_location: HashMap<Location, UnitId>,
}

/// Every registered unit, indexed by id and by location.
///
/// The index lock is only held for lookups and inserts; unit state lives
/// behind each unit's own mutex.
#[derive(Debug, Default)]
pub struct UnitTable {
    index: RwLock<Index>,
}

impl UnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit under its id and location
    pub fn insert(&self, unit: StorageUnit) -> Result<SharedUnit, RegistryError> {
        let mut index = self.index.write();
        if index.units.contains_key(unit.id()) {
            return Err(RegistryError::DuplicateUnit(unit.id().clone()));
        }
        if let Some(existing) = index.by_location.get(unit.location()) {
            return Err(RegistryError::LocationOccupied {
                location: unit.location().clone(),
                existing: existing.clone(),
            });
        }
        let id = unit.id().clone();
        index.by_location.insert(unit.location().clone(), id.clone());
        let shared = Arc::new(Mutex::new(unit));
        index.units.insert(id, Arc::clone(&shared));
        Ok(shared)
    }

    /// Detach a unit from both indices
    pub fn remove(&self, id: &UnitId) -> Option<SharedUnit> {
        let mut index = self.index.write();
        let unit = index.units.remove(id)?;
        let location = unit.lock().location().clone();
        index.by_location.remove(&location);
        Some(unit)
    }

    pub fn get(&self, id: &UnitId) -> Option<SharedUnit> {
        self.index.read().units.get(id).cloned()
    }

    pub fn id_at(&self, location: &Location) -> Option<UnitId> {
        self.index.read().by_location.get(location).cloned()
    }

    pub fn find_by_location(&self, location: &Location) -> Option<SharedUnit> {
        let index = self.index.read();
        let id = index.by_location.get(location)?;
        index.units.get(id).cloned()
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.index.read().units.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.index.read().units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().units.is_empty()
    }
}

impl SnapshotSource for UnitTable {
    fn snapshot(&self, id: &UnitId) -> Option<UnitRecord> {
        let unit = self.get(id)?;
        // Copy under the lock, encode outside it
        let (mut record, store) = {
            let unit = unit.lock();
            (unit.record_header(), unit.inventory().snapshot())
        };
        record.inventory = encode_store(&store);
        Some(record)
    }

    fn unit_ids(&self) -> Vec<UnitId> {
        self.ids()
    }
}

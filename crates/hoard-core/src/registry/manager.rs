use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::inventory::{DisplayBatch, InventoryMetrics};
use crate::item::{BatchLimits, ItemBatch};
use crate::kernel::component::KernelComponent;
use crate::kernel::error::{Error, Result};
use crate::persistence::{PersistenceQueue, SaveReport, UnitId, UnitRecord};
use crate::registry::error::RegistryError;
use crate::registry::table::{SharedUnit, UnitTable};
use crate::registry::unit::{validate_entity_kind, validate_world, Location, StorageUnit, UnitSettings};
use crate::storage::EngineConfig;

/// Answers whether a location still hosts a physical storage unit.
///
/// Only consulted once the host world is ready, see
/// [`StorageRegistry::purge_ghosts`].
pub trait WorldProbe: Send + Sync {
    /// Whether the world is loaded at all; units in unloaded worlds are kept
    fn is_world_loaded(&self, _world: &str) -> bool {
        true
    }

    fn hosts_unit(&self, location: &Location, entity_kind: &str) -> bool;
}

/// Outcome of [`StorageRegistry::load_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Records that could not be read, parsed or indexed
    pub skipped: usize,
    /// Inventory tokens dropped across all loaded records
    pub decode_issues: usize,
}

/// Owns every storage unit and routes structural changes to the
/// persistence queue.
#[derive(Debug)]
pub struct StorageRegistry {
    table: Arc<UnitTable>,
    queue: PersistenceQueue,
    config: EngineConfig,
    limits: Arc<dyn BatchLimits>,
}

impl StorageRegistry {
    /// `queue` must snapshot from the same `table`.
    pub fn new(
        table: Arc<UnitTable>,
        queue: PersistenceQueue,
        config: EngineConfig,
        limits: Arc<dyn BatchLimits>,
    ) -> Self {
        Self {
            table,
            queue,
            config,
            limits,
        }
    }

    pub fn table(&self) -> &Arc<UnitTable> {
        &self.table
    }

    pub fn queue(&self) -> &PersistenceQueue {
        &self.queue
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn ids(&self) -> Vec<UnitId> {
        self.table.ids()
    }

    pub fn get(&self, id: &UnitId) -> Option<SharedUnit> {
        self.table.get(id)
    }

    pub fn find_by_location(&self, location: &Location) -> Option<UnitId> {
        self.table.id_at(location)
    }

    fn unit(&self, id: &UnitId) -> Result<SharedUnit> {
        self.table
            .get(id)
            .ok_or_else(|| RegistryError::UnitNotFound(id.clone()).into())
    }

    /// Create and register a unit, then save it right away
    pub fn create(&self, entity_kind: &str, location: Location, stack_size: u32) -> Result<UnitId> {
        if stack_size == 0 {
            return Err(RegistryError::InvalidStackSize(stack_size).into());
        }
        validate_world(&location.world)?;
        let entity_kind = validate_entity_kind(entity_kind)?;
        let settings = UnitSettings {
            stack_size,
            max_slots: self.config.max_slots(stack_size),
            ..UnitSettings::default()
        };
        let id = UnitId::generate();
        let unit = StorageUnit::new(id.clone(), location, entity_kind, settings, Arc::clone(&self.limits));
        self.table.insert(unit)?;
        self.queue.queue_immediate(&id);
        log::info!("Created storage unit {}", id);
        Ok(id)
    }

    /// Unregister a unit; the queued write deletes its record
    pub fn remove(&self, id: &UnitId) -> Result<()> {
        if self.table.remove(id).is_none() {
            return Err(RegistryError::UnitNotFound(id.clone()).into());
        }
        self.queue.queue_immediate(id);
        log::info!("Removed storage unit {}", id);
        Ok(())
    }

    /// Change a unit's stack size, migrating its items into an inventory
    /// with the new slot budget.
    pub fn resize(&self, id: &UnitId, stack_size: u32) -> Result<()> {
        if stack_size == 0 {
            return Err(RegistryError::InvalidStackSize(stack_size).into());
        }
        let unit = self.unit(id)?;
        let max_slots = self.config.max_slots(stack_size);
        unit.lock().resize(stack_size, max_slots);
        self.queue.queue_immediate(id);
        log::debug!("Resized storage unit {} to stack size {} ({} slots)", id, stack_size, max_slots);
        Ok(())
    }

    /// Merge `batches` into the unit's inventory.
    ///
    /// A request that would push the unit's item total past `u64::MAX` is
    /// rejected as a whole and leaves the inventory untouched.
    pub fn add_items(&self, id: &UnitId, batches: &[ItemBatch]) -> Result<()> {
        let unit = self.unit(id)?;
        let mut unit = unit.lock();
        let fits = batches
            .iter()
            .try_fold(unit.inventory().total_items(), |total, batch| total.checked_add(batch.quantity))
            .is_some();
        if !fits {
            log::error!("Rejected item batches for storage unit {}: item total would overflow", id);
            return Err(RegistryError::QuantityOverflow(id.clone()).into());
        }
        unit.inventory_mut().add_batches(batches);
        drop(unit);
        self.queue.mark_modified(id);
        Ok(())
    }

    /// All-or-nothing removal; `Ok(false)` when stock is short
    pub fn remove_items(&self, id: &UnitId, batches: &[ItemBatch]) -> Result<bool> {
        let unit = self.unit(id)?;
        let removed = unit.lock().inventory_mut().remove_batches(batches);
        if removed {
            self.queue.mark_modified(id);
        }
        Ok(removed)
    }

    /// One GUI page of the unit's projection
    pub fn display_page(&self, id: &UnitId, page_index: u32) -> Result<BTreeMap<u32, DisplayBatch>> {
        let unit = self.unit(id)?;
        let page = unit
            .lock()
            .inventory_mut()
            .display_page(page_index, self.config.slots_per_page);
        Ok(page)
    }

    pub fn page_count(&self, id: &UnitId) -> Result<u32> {
        let unit = self.unit(id)?;
        let pages = unit.lock().inventory().page_count(self.config.slots_per_page);
        Ok(pages)
    }

    pub fn metrics(&self, id: &UnitId) -> Result<InventoryMetrics> {
        let unit = self.unit(id)?;
        let metrics = unit.lock().inventory().metrics();
        Ok(metrics)
    }

    /// Save a unit now instead of at the next flush
    pub fn force_save(&self, id: &UnitId) -> Result<()> {
        self.unit(id)?;
        self.queue.queue_immediate(id);
        Ok(())
    }

    pub fn mark_modified(&self, id: &UnitId) -> Result<()> {
        self.unit(id)?;
        self.queue.mark_modified(id);
        Ok(())
    }

    /// Read every record and register the units it describes.
    ///
    /// Unreadable or malformed records, records whose id is already
    /// registered and records whose location is already taken are skipped
    /// with a warning; none of them abort the load.
    pub async fn load_all(&self) -> Result<LoadReport> {
        let records = self.queue.records().clone();
        let read = tokio::task::spawn_blocking(move || -> Result<Vec<(UnitId, Result<UnitRecord>)>> {
            let ids = records.list()?;
            Ok(ids
                .into_iter()
                .map(|id| {
                    let record = records.read(&id);
                    (id, record)
                })
                .collect())
        })
        .await
        .map_err(|e| Error::Other(format!("Record load task failed: {}", e)))??;

        let mut report = LoadReport::default();
        for (id, record) in read {
            match self.register_record(id.clone(), record) {
                Ok(issues) => {
                    report.loaded += 1;
                    report.decode_issues += issues;
                }
                Err(e) => {
                    log::warn!("Skipping storage unit record {}: {}", id, e);
                    report.skipped += 1;
                }
            }
        }
        log::info!(
            "Loaded {} storage units ({} skipped, {} inventory entries dropped)",
            report.loaded,
            report.skipped,
            report.decode_issues
        );
        Ok(report)
    }

    fn register_record(&self, id: UnitId, record: Result<UnitRecord>) -> Result<usize> {
        let record = record?;
        let (unit, issues) = StorageUnit::from_record(
            id.clone(),
            &record,
            self.config.slots_per_page,
            Arc::clone(&self.limits),
        )?;
        self.table.insert(unit)?;
        if !issues.is_empty() {
            // Rewrite without the dropped tokens
            self.queue.mark_modified(&id);
        }
        Ok(issues.len())
    }

    /// Remove units whose location no longer hosts a physical unit.
    ///
    /// Run once the host world is ready. Units in worlds that are not loaded
    /// are kept. Returns the removed ids.
    pub fn purge_ghosts(&self, probe: &dyn WorldProbe) -> Vec<UnitId> {
        let mut removed = Vec::new();
        for id in self.table.ids() {
            let Some(unit) = self.table.get(&id) else {
                continue;
            };
            let (location, entity_kind) = {
                let unit = unit.lock();
                (unit.location().clone(), unit.entity_kind().to_string())
            };
            if !probe.is_world_loaded(&location.world) {
                continue;
            }
            if probe.hosts_unit(&location, &entity_kind) {
                continue;
            }
            log::warn!("Removing ghost storage unit {} at {}", id, location);
            if self.remove(&id).is_ok() {
                removed.push(id);
            }
        }
        removed
    }

    /// Best-effort save of every unit and every pending change
    pub async fn save_all(&self) -> SaveReport {
        self.queue.save_all().await
    }
}

#[async_trait]
impl KernelComponent for StorageRegistry {
    fn name(&self) -> &'static str {
        "StorageRegistry"
    }

    async fn initialize(&self) -> Result<()> {
        self.load_all().await?;
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        log::info!("Storage registry stopping with {} units", self.table.len());
        Ok(())
    }
}

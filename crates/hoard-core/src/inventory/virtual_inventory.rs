use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::inventory::projection::{estimate_used_slots, DisplayBatch, DisplayProjection};
use crate::inventory::store::ConsolidatedStore;
use crate::item::{BatchLimits, ItemBatch, ItemSignature};

/// Capacity and fill figures polled by GUI text and capacity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryMetrics {
    pub used_slots: u32,
    pub max_slots: u32,
    pub total_items: u64,
    pub distinct: usize,
}

/// Consolidated item storage of one storage unit plus its cached display.
///
/// Mutations only touch the store and drop the cached projection; the
/// projection is rebuilt lazily the next time a page is requested.
#[derive(Clone)]
pub struct VirtualInventory {
    max_slots: u32,
    store: ConsolidatedStore,
    /// `None` means dirty
    projection: Option<DisplayProjection>,
    limits: Arc<dyn BatchLimits>,
}

impl VirtualInventory {
    /// Create an empty inventory with a fixed slot budget
    pub fn new(max_slots: u32, limits: Arc<dyn BatchLimits>) -> Self {
        Self {
            max_slots,
            store: ConsolidatedStore::new(),
            projection: None,
            limits,
        }
    }

    /// Build a new-capacity instance holding the same consolidated entries.
    ///
    /// Used on resize: the owner swaps the returned value in wholesale.
    pub fn resized(&self, max_slots: u32) -> Self {
        let mut next = Self::new(max_slots, Arc::clone(&self.limits));
        next.add_batches(&self.store.to_batches());
        next
    }

    /// Merge every batch into the store. Zero-quantity batches are ignored.
    pub fn add_batches(&mut self, batches: &[ItemBatch]) {
        let mut touched = false;
        for batch in batches.iter().filter(|b| b.quantity > 0) {
            self.store.add(batch.signature.clone(), batch.quantity);
            touched = true;
        }
        if touched {
            self.projection = None;
        }
    }

    /// All-or-nothing removal. Returns `false` (store untouched) when any
    /// signature lacks the summed quantity requested for it.
    pub fn remove_batches(&mut self, batches: &[ItemBatch]) -> bool {
        if !self.store.remove_all(batches) {
            return false;
        }
        if batches.iter().any(|b| b.quantity > 0) {
            self.projection = None;
        }
        true
    }

    /// Fresh projection, rebuilding it first if a mutation dropped it
    pub fn projection(&mut self) -> &DisplayProjection {
        let (store, limits, max_slots) = (&self.store, &self.limits, self.max_slots);
        self.projection
            .get_or_insert_with(|| DisplayProjection::build(store, limits.as_ref(), max_slots))
    }

    /// One page of the projection with 0-based local slot indices
    pub fn display_page(&mut self, page_index: u32, page_size: u32) -> BTreeMap<u32, DisplayBatch> {
        self.projection().page(page_index, page_size)
    }

    /// Exact occupied slot count when the projection is fresh, otherwise a
    /// cheap upper-bound estimate. Always within `0..=max_slots`.
    pub fn used_slots(&self) -> u32 {
        match &self.projection {
            Some(projection) => projection.len(),
            None => estimate_used_slots(&self.store, self.limits.as_ref(), self.max_slots),
        }
    }

    pub fn free_slots(&self) -> u32 {
        self.max_slots - self.used_slots()
    }

    pub fn total_items(&self) -> u64 {
        self.store.total()
    }

    pub fn max_slots(&self) -> u32 {
        self.max_slots
    }

    /// Number of pages of `page_size` slots covering `max_slots`
    pub fn page_count(&self, page_size: u32) -> u32 {
        if page_size == 0 {
            return 0;
        }
        self.max_slots.div_ceil(page_size)
    }

    pub fn quantity_of(&self, signature: &ItemSignature) -> u64 {
        self.store.quantity_of(signature)
    }

    /// Distinct signatures held
    pub fn distinct(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Whether the next page request has to rebuild the projection
    pub fn is_dirty(&self) -> bool {
        self.projection.is_none()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ItemSignature, u64)> + '_ {
        self.store.iter()
    }

    pub fn store(&self) -> &ConsolidatedStore {
        &self.store
    }

    /// Owned copy of the consolidated store, for serialization off-thread
    pub fn snapshot(&self) -> ConsolidatedStore {
        self.store.clone()
    }

    pub fn metrics(&self) -> InventoryMetrics {
        InventoryMetrics {
            used_slots: self.used_slots(),
            max_slots: self.max_slots,
            total_items: self.total_items(),
            distinct: self.distinct(),
        }
    }
}

impl fmt::Debug for VirtualInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualInventory")
            .field("max_slots", &self.max_slots)
            .field("distinct", &self.store.len())
            .field("total_items", &self.store.total())
            .field("dirty", &self.projection.is_none())
            .finish()
    }
}

use std::collections::BTreeMap;

use crate::inventory::store::ConsolidatedStore;
use crate::item::{BatchLimits, ItemSignature};

/// Concrete contents of one display slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayBatch {
    pub signature: ItemSignature,
    /// Never exceeds the kind's max batch size
    pub count: u32,
}

/// Slot-indexed rendering of a store, capped at `max_slots`.
///
/// Slots are filled contiguously from 0, so slot `i` is `slots[i]`. Quantity
/// that does not fit is simply not shown; it stays in the store and becomes
/// visible again once earlier entries shrink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayProjection {
    slots: Vec<DisplayBatch>,
    max_slots: u32,
}

impl DisplayProjection {
    /// Greedily split each entry, in canonical order, into full batches.
    ///
    /// Work is bounded by the number of distinct signatures plus the number
    /// of slots actually produced.
    pub fn build(store: &ConsolidatedStore, limits: &dyn BatchLimits, max_slots: u32) -> Self {
        let capacity = max_slots as usize;
        let mut slots = Vec::with_capacity(capacity.min(store.len().saturating_mul(2)));

        'entries: for (signature, quantity) in store.iter() {
            let max_batch = u64::from(limits.max_batch_size(signature.kind()).max(1));
            let mut remaining = quantity;
            while remaining > 0 {
                if slots.len() >= capacity {
                    break 'entries;
                }
                let count = remaining.min(max_batch);
                slots.push(DisplayBatch {
                    signature: signature.clone(),
                    count: count as u32,
                });
                remaining -= count;
            }
        }

        Self { slots, max_slots }
    }

    /// Occupied slot count
    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn max_slots(&self) -> u32 {
        self.max_slots
    }

    pub fn get(&self, slot: u32) -> Option<&DisplayBatch> {
        self.slots.get(slot as usize)
    }

    pub fn slots(&self) -> &[DisplayBatch] {
        &self.slots
    }

    /// Sum of all displayed counts (≤ the store total)
    pub fn visible_total(&self) -> u64 {
        self.slots.iter().map(|s| u64::from(s.count)).sum()
    }

    /// Slots `[page_index * page_size, (page_index + 1) * page_size)`,
    /// re-indexed from 0. Out-of-range pages are empty.
    pub fn page(&self, page_index: u32, page_size: u32) -> BTreeMap<u32, DisplayBatch> {
        if page_size == 0 {
            return BTreeMap::new();
        }
        let start = u64::from(page_index) * u64::from(page_size);
        if start >= self.slots.len() as u64 {
            return BTreeMap::new();
        }
        self.slots
            .iter()
            .skip(start as usize)
            .take(page_size as usize)
            .enumerate()
            .map(|(local, batch)| (local as u32, batch.clone()))
            .collect()
    }
}

/// Upper bound on the slots a rebuild would fill, without rebuilding.
///
/// Sums `ceil(quantity / max_batch)` per signature and caps at `max_slots`.
pub fn estimate_used_slots(store: &ConsolidatedStore, limits: &dyn BatchLimits, max_slots: u32) -> u32 {
    let cap = u64::from(max_slots);
    let mut estimate: u64 = 0;
    for (signature, quantity) in store.iter() {
        let max_batch = u64::from(limits.max_batch_size(signature.kind()).max(1));
        estimate = estimate.saturating_add(quantity.div_ceil(max_batch));
        if estimate >= cap {
            return max_slots;
        }
    }
    estimate as u32
}

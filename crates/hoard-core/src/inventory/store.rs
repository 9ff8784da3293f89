use std::collections::BTreeMap;

use crate::item::{ItemBatch, ItemSignature};

/// Authoritative "how much of what" ledger of one storage unit.
///
/// Entries are kept in canonical signature order so every consumer iterating
/// the store (projection, codec) sees the same sequence regardless of
/// insertion history. No entry ever holds a zero quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidatedStore {
    entries: BTreeMap<ItemSignature, u64>,
    total: u64,
}

impl ConsolidatedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(signature, quantity)` pairs, summing duplicates
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ItemSignature, u64)>,
    {
        let mut store = Self::new();
        for (signature, quantity) in entries {
            store.add(signature, quantity);
        }
        store
    }

    /// Number of distinct signatures
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all quantities
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn quantity_of(&self, signature: &ItemSignature) -> u64 {
        self.entries.get(signature).copied().unwrap_or(0)
    }

    /// Entries in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&ItemSignature, u64)> + '_ {
        self.entries.iter().map(|(signature, quantity)| (signature, *quantity))
    }

    /// One unbounded batch per entry, in canonical order
    pub fn to_batches(&self) -> Vec<ItemBatch> {
        self.iter()
            .map(|(signature, quantity)| ItemBatch::new(signature.clone(), quantity))
            .collect()
    }

    /// Merge `quantity` into the entry for `signature`.
    ///
    /// Overflowing `u64` is an invariant violation: it trips a debug assertion
    /// and saturates in release builds. Zero quantities are ignored.
    pub fn add(&mut self, signature: ItemSignature, quantity: u64) {
        if quantity == 0 {
            return;
        }
        let slot = self.entries.entry(signature).or_insert(0);
        *slot = match slot.checked_add(quantity) {
            Some(merged) => merged,
            None => {
                debug_assert!(false, "item quantity overflowed u64");
                u64::MAX
            }
        };
        self.total = match self.total.checked_add(quantity) {
            Some(total) => total,
            None => {
                debug_assert!(false, "store total overflowed u64");
                u64::MAX
            }
        };
    }

    /// Remove every batch or nothing.
    ///
    /// Requirements are summed per signature across the whole request before
    /// anything is touched; if any signature is short the store is left
    /// exactly as it was and `false` is returned.
    pub fn remove_all(&mut self, batches: &[ItemBatch]) -> bool {
        let mut required: BTreeMap<&ItemSignature, u64> = BTreeMap::new();
        for batch in batches.iter().filter(|b| b.quantity > 0) {
            let need = required.entry(&batch.signature).or_insert(0);
            match need.checked_add(batch.quantity) {
                Some(sum) => *need = sum,
                // More than can ever be stored: certainly insufficient
                None => return false,
            }
        }

        if required
            .iter()
            .any(|(signature, need)| self.quantity_of(signature) < *need)
        {
            return false;
        }

        for (signature, need) in required {
            if let Some(have) = self.entries.get_mut(signature) {
                *have -= need;
                if *have == 0 {
                    self.entries.remove(signature);
                }
            }
            self.total -= need;
        }
        true
    }
}

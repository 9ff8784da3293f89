use std::collections::HashMap;
use std::fmt::Debug;

use crate::item::signature::ItemKind;
use crate::kernel::constants;

/// Source of the maximum batch size per item kind.
///
/// The host game knows the real stack limits; the engine only needs this one
/// lookup when it projects a store onto display slots.
pub trait BatchLimits: Send + Sync + Debug {
    /// Largest count a single display slot may hold for `kind`. Never zero.
    fn max_batch_size(&self, kind: &ItemKind) -> u32;
}

/// Table-driven limits: one default plus per-kind overrides.
#[derive(Debug, Clone)]
pub struct BatchTable {
    default: u32,
    overrides: HashMap<ItemKind, u32>,
}

impl BatchTable {
    pub fn new(default: u32) -> Self {
        Self {
            default: default.max(1),
            overrides: HashMap::new(),
        }
    }

    /// Set the limit for one kind (clamped to at least 1)
    pub fn with_limit(mut self, kind: ItemKind, limit: u32) -> Self {
        self.set_limit(kind, limit);
        self
    }

    pub fn set_limit(&mut self, kind: ItemKind, limit: u32) {
        self.overrides.insert(kind, limit.max(1));
    }

    pub fn default_limit(&self) -> u32 {
        self.default
    }
}

impl Default for BatchTable {
    fn default() -> Self {
        Self::new(constants::DEFAULT_MAX_BATCH)
    }
}

impl BatchLimits for BatchTable {
    fn max_batch_size(&self, kind: &ItemKind) -> u32 {
        self.overrides.get(kind).copied().unwrap_or(self.default)
    }
}

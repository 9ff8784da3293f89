use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::item::{BatchTable, ItemKind};
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::storage::config::ConfigData;

const KEY_SLOTS_PER_PAGE: &str = "slots_per_page";
const KEY_FLUSH_INTERVAL: &str = "flush_interval_secs";
const KEY_DEFAULT_MAX_BATCH: &str = "default_max_batch";
const KEY_MAX_BATCH_OVERRIDES: &str = "max_batch_overrides";
const KEY_RECORDS_DIR: &str = "records_dir";

/// Tunables of the storage engine, read from the `engine` config document.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Display slots per GUI page; one page per unit of stack size
    pub slots_per_page: u32,
    /// Period of the batched flush of modified units
    pub flush_interval: Duration,
    pub default_max_batch: u32,
    /// Kind name -> max batch size
    pub max_batch_overrides: BTreeMap<String, u32>,
    /// Record directory, relative to the data root
    pub records_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slots_per_page: constants::DEFAULT_SLOTS_PER_PAGE,
            flush_interval: Duration::from_secs(constants::DEFAULT_FLUSH_INTERVAL_SECS),
            default_max_batch: constants::DEFAULT_MAX_BATCH,
            max_batch_overrides: BTreeMap::new(),
            records_dir: PathBuf::from(constants::RECORDS_DIR),
        }
    }
}

impl EngineConfig {
    /// Read values from a config document, falling back to defaults per key
    pub fn from_config_data(data: &ConfigData) -> Self {
        let defaults = Self::default();
        let flush_secs = data.get_or(KEY_FLUSH_INTERVAL, defaults.flush_interval.as_secs());
        Self {
            slots_per_page: data.get_or(KEY_SLOTS_PER_PAGE, defaults.slots_per_page).max(1),
            flush_interval: Duration::from_secs(flush_secs.max(1)),
            default_max_batch: data.get_or(KEY_DEFAULT_MAX_BATCH, defaults.default_max_batch).max(1),
            max_batch_overrides: data.get_or(KEY_MAX_BATCH_OVERRIDES, defaults.max_batch_overrides),
            records_dir: data.get_or(KEY_RECORDS_DIR, defaults.records_dir),
        }
    }

    pub fn to_config_data(&self) -> Result<ConfigData> {
        let mut data = ConfigData::new();
        data.set(KEY_SLOTS_PER_PAGE, self.slots_per_page)?;
        data.set(KEY_FLUSH_INTERVAL, self.flush_interval.as_secs())?;
        data.set(KEY_DEFAULT_MAX_BATCH, self.default_max_batch)?;
        data.set(KEY_MAX_BATCH_OVERRIDES, &self.max_batch_overrides)?;
        data.set(KEY_RECORDS_DIR, &self.records_dir)?;
        Ok(data)
    }

    /// Slot budget of a unit with the given stack size
    pub fn max_slots(&self, stack_size: u32) -> u32 {
        stack_size.saturating_mul(self.slots_per_page)
    }

    /// Batch limits table; override keys that are not valid kind names are
    /// ignored with a warning
    pub fn batch_table(&self) -> BatchTable {
        let mut table = BatchTable::new(self.default_max_batch);
        for (name, limit) in &self.max_batch_overrides {
            match ItemKind::new(name.as_str()) {
                Ok(kind) => table.set_limit(kind, *limit),
                Err(e) => log::warn!("Ignoring max batch override '{}': {}", name, e),
            }
        }
        table
    }
}

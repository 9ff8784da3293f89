
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::item::{BatchLimits, BatchTable, ItemBatch, ItemKind, ItemSignature};
use crate::persistence::{PersistenceQueue, RecordStore};
use crate::registry::{Location, StorageRegistry, UnitTable};
use crate::storage::{EngineConfig, LocalStorageProvider, StorageProvider};

pub(super) fn kind(name: &str) -> ItemKind {
    ItemKind::new(name).unwrap()
}

pub(super) fn plain(name: &str, quantity: u64) -> ItemBatch {
    ItemBatch::plain(kind(name), quantity)
}

pub(super) fn scalar(name: &str, value: i64, quantity: u64) -> ItemBatch {
    ItemBatch::new(ItemSignature::scalar(kind(name), value), quantity)
}

pub(super) fn limits() -> Arc<dyn BatchLimits> {
    Arc::new(BatchTable::new(64).with_limit(kind("SWORD"), 1))
}

pub(super) fn loc(x: i32) -> Location {
    Location::new("world", x, 64, 0)
}

/// Registry over `root` with the batch flush effectively disabled.
/// Must be called inside a tokio runtime.
pub(super) fn registry_in(root: &Path) -> StorageRegistry {
    let table = Arc::new(UnitTable::new());
    let provider = Arc::new(LocalStorageProvider::new(root.to_path_buf())) as Arc<dyn StorageProvider>;
    let records = RecordStore::new(provider, "spawners");
    let queue = PersistenceQueue::new(records, table.clone(), Duration::from_secs(3600)).expect("inside runtime");
    StorageRegistry::new(table, queue, EngineConfig::default(), limits())
}

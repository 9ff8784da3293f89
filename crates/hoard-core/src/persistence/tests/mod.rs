// Persistence test module
#[cfg(test)]
mod queue_tests;
#[cfg(test)]
mod state_tests;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::kernel::error::Result;
use crate::persistence::queue::SnapshotSource;
use crate::persistence::records::{UnitId, UnitRecord};
use crate::storage::error::StorageSystemError;
use crate::storage::{LocalStorageProvider, StorageProvider};

pub(super) fn id(s: &str) -> UnitId {
    s.parse().expect("valid unit id")
}

pub(super) fn record(kind: &str, inventory: &[&str]) -> UnitRecord {
    UnitRecord {
        data_version: 1,
        location: "world,1,64,-3".to_string(),
        kind: kind.to_string(),
        settings: "0,true,16,false,500,45,1000,1,4,1,0,false".to_string(),
        inventory: inventory.iter().map(|t| t.to_string()).collect(),
    }
}

/// In-memory unit table for driving the queue
#[derive(Debug, Default)]
pub(super) struct MemorySource {
    pub units: Mutex<BTreeMap<UnitId, UnitRecord>>,
}

impl MemorySource {
    pub fn put(&self, id: &UnitId, record: UnitRecord) {
        self.units.lock().insert(id.clone(), record);
    }

    pub fn drop_unit(&self, id: &UnitId) {
        self.units.lock().remove(id);
    }
}

impl SnapshotSource for MemorySource {
    fn snapshot(&self, id: &UnitId) -> Option<UnitRecord> {
        self.units.lock().get(id).cloned()
    }

    fn unit_ids(&self) -> Vec<UnitId> {
        self.units.lock().keys().cloned().collect()
    }
}

/// Local provider whose writes can be switched to fail
#[derive(Debug)]
pub(super) struct FlakyProvider {
    inner: LocalStorageProvider,
    pub failing: AtomicBool,
    pub writes: AtomicUsize,
}

impl FlakyProvider {
    pub fn new(root: PathBuf) -> Self {
        Self {
            inner: LocalStorageProvider::new(root),
            failing: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl StorageProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }
    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }
    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.inner.create_dir_all(path)
    }
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.inner.read_to_string(path)
    }
    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageSystemError::OperationFailed {
                operation: "write_string".to_string(),
                path: Some(path.to_path_buf()),
                message: "disk full".to_string(),
            }
            .into());
        }
        self.inner.write_string(path, contents)
    }
    fn remove_file(&self, path: &Path) -> Result<()> {
        self.inner.remove_file(path)
    }
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.inner.read_dir(path)
    }
}

pub(super) fn flaky(root: &Path) -> Arc<FlakyProvider> {
    Arc::new(FlakyProvider::new(root.to_path_buf()))
}

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;
use crate::storage::StorageProvider;

/// Identity of a storage unit; doubles as the record file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    /// Fresh random id (uuid v4, simple form)
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UnitId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let valid = !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::Other(format!("Invalid unit id '{}'", s)));
        }
        Ok(Self(s.to_string()))
    }
}

fn current_data_version() -> u32 {
    constants::DATA_VERSION
}

/// On-disk shape of one storage unit.
///
/// `location` and `settings` are comma-joined strings and `inventory` is the
/// codec's token list; the registry owns their interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    #[serde(default = "current_data_version")]
    pub data_version: u32,
    pub location: String,
    pub kind: String,
    pub settings: String,
    #[serde(default)]
    pub inventory: Vec<String>,
}

impl UnitRecord {
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| StorageSystemError::serialization("yaml", e).into())
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| StorageSystemError::deserialization("yaml", e).into())
    }
}

/// Record files under one directory of a [`StorageProvider`].
///
/// All methods block; callers on the runtime go through `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct RecordStore {
    provider: Arc<dyn StorageProvider>,
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(provider: Arc<dyn StorageProvider>, dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn provider(&self) -> &Arc<dyn StorageProvider> {
        &self.provider
    }

    pub fn path_for(&self, id: &UnitId) -> PathBuf {
        self.dir
            .join(format!("{}.{}", id.as_str(), constants::RECORD_EXTENSION))
    }

    pub fn ensure_dir(&self) -> Result<()> {
        if self.provider.is_dir(&self.dir) {
            return Ok(());
        }
        self.provider.create_dir_all(&self.dir)
    }

    pub fn exists(&self, id: &UnitId) -> bool {
        self.provider.is_file(&self.path_for(id))
    }

    pub fn write(&self, id: &UnitId, record: &UnitRecord) -> Result<()> {
        let text = record.to_yaml()?;
        self.provider.write_string(&self.path_for(id), &text)
    }

    pub fn read(&self, id: &UnitId) -> Result<UnitRecord> {
        let text = self.provider.read_to_string(&self.path_for(id))?;
        UnitRecord::from_yaml(&text)
    }

    /// Delete a record; a missing file is not an error
    pub fn delete(&self, id: &UnitId) -> Result<()> {
        let path = self.path_for(id);
        if !self.provider.exists(&path) {
            return Ok(());
        }
        self.provider.remove_file(&path)
    }

    /// Ids of every record file, sorted. Files that are not records or whose
    /// stem is not a valid id are skipped.
    pub fn list(&self) -> Result<Vec<UnitId>> {
        if !self.provider.is_dir(&self.dir) {
            return Ok(Vec::new());
        }
        let mut ids: Vec<UnitId> = self
            .provider
            .read_dir(&self.dir)?
            .into_iter()
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(constants::RECORD_EXTENSION))
            })
            .filter_map(|path| {
                let stem = path.file_stem()?.to_str()?;
                match stem.parse() {
                    Ok(id) => Some(id),
                    Err(e) => {
                        log::warn!("Ignoring record file {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}

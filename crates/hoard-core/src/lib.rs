//! # hoard-core
//!
//! Virtual item storage for spawner storage units: consolidated inventories
//! of unbounded size, a paged display projection, a compact token codec and
//! batched asynchronous persistence.
pub mod codec;
pub mod inventory;
pub mod item;
pub mod kernel;
pub mod persistence;
pub mod registry;
pub mod storage;

pub use codec::{decode_tokens, encode_store, DecodeIssue};
pub use inventory::{ConsolidatedStore, DisplayBatch, DisplayProjection, InventoryMetrics, VirtualInventory};
pub use item::{BatchLimits, BatchTable, ItemBatch, ItemKind, ItemSignature, Variant};
pub use kernel::error::Error as KernelError;
pub use kernel::Application;
pub use persistence::{PersistenceQueue, SaveReport, UnitId};
pub use registry::{LoadReport, Location, StorageRegistry, WorldProbe};
pub use storage::{EngineConfig, StorageProvider};

#[cfg(test)]
mod tests;

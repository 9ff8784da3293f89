//! # Hoard Persistence
//!
//! Keeps record files eventually consistent with in-memory storage units.
//!
//! - [`RecordStore`]: one YAML file per unit under the records directory.
//! - [`PersistenceQueue`]: immediate FIFO plus a periodic batch flush of the
//!   modified set, both served by a single background writer.
//! - [`SaveState`]: the per-unit save state machine the queue tracks.
pub mod queue;
pub mod records;
pub mod state;

pub use queue::{PersistenceQueue, SaveReport, SnapshotSource};
pub use records::{RecordStore, UnitId, UnitRecord};
pub use state::SaveState;

#[cfg(test)]
mod tests;

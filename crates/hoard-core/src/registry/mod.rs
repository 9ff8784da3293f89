//! # Hoard Storage Registry
//!
//! Owns every storage unit, indexes units by id and by location, and routes
//! create/remove/resize/load/save calls to the
//! [`PersistenceQueue`](crate::persistence::PersistenceQueue) and each unit's
//! [`VirtualInventory`](crate::inventory::VirtualInventory).
pub mod error;
pub mod manager;
pub mod table;
pub mod unit;

pub use error::RegistryError;
pub use manager::{LoadReport, StorageRegistry, WorldProbe};
pub use table::{SharedUnit, UnitTable};
pub use unit::{Location, StorageUnit, UnitSettings};

#[cfg(test)]
mod tests;

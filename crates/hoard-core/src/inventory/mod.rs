//! # Hoard Virtual Inventory
//!
//! In-memory item storage for a single storage unit.
//!
//! - [`ConsolidatedStore`](store::ConsolidatedStore): unbounded quantity per
//!   [`ItemSignature`](crate::item::ItemSignature), the source of truth.
//! - [`DisplayProjection`](projection::DisplayProjection): deterministic,
//!   slot-capped rendering of a store for paged GUIs.
//! - [`VirtualInventory`](virtual_inventory::VirtualInventory): owns both,
//!   exposing bulk add/remove, metrics and page slices.
//!
//! Everything here is synchronous and performs no I/O.
pub mod projection;
pub mod store;
pub mod virtual_inventory;

pub use projection::{estimate_used_slots, DisplayBatch, DisplayProjection};
pub use store::ConsolidatedStore;
pub use virtual_inventory::{InventoryMetrics, VirtualInventory};

#[cfg(test)]
mod tests;

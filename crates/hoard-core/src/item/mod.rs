//! # Hoard Item Identity
//!
//! Leaf value types shared by every other module:
//!
//! - [`ItemKind`] / [`Variant`] / [`ItemSignature`]: what an item *is*,
//!   independent of how many there are.
//! - [`ItemBatch`]: a signature plus a quantity, the unit of add/remove calls.
//! - [`BatchLimits`]: how many items of a kind fit in one display slot.
pub mod error;
pub mod limits;
pub mod signature;

pub use error::SignatureError;
pub use limits::{BatchLimits, BatchTable};
pub use signature::{
    EffectFields, ItemBatch, ItemKind, ItemSignature, Variant, VariantClass, RESERVED_CHARS,
};

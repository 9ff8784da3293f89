//! # Hoard Serialization Codec
//!
//! Converts a [`ConsolidatedStore`](crate::inventory::ConsolidatedStore) to
//! the compact text tokens stored under a record's `inventory:` key, and back.
//!
//! The grammar branches on the delimiter following the kind name:
//!
//! ```text
//! STICK:40                 plain kind, total quantity
//! SWORD;3:1,7:2            scalar variant 3 x1, variant 7 x2
//! POTION#SPEED;true:5      structured variant (fields split by ';') x5
//! ```
//!
//! Only the resulting `(signature, quantity)` multiset is part of the
//! round-trip contract; token grouping and order are not.
pub mod error;
pub mod token;

pub use error::DecodeIssue;
pub use token::{decode_token, decode_tokens, encode_store, DecodedStore};

#[cfg(test)]
mod tests;

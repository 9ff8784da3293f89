//! # Hoard Item Errors
//!
//! Errors raised while constructing item identities. Kind names and
//! structured variant fields end up inside persisted tokens, so anything that
//! would collide with the token grammar is rejected up front.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Item kind name is empty")]
    EmptyKind,

    #[error("Item kind '{kind}' contains reserved character '{character}'")]
    ReservedInKind { kind: String, character: char },

    #[error("Structured variant needs at least one field")]
    NoFields,

    #[error("Structured variant field '{field}' contains reserved character '{character}'")]
    ReservedInField { field: String, character: char },
}

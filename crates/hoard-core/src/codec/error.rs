//! # Hoard Codec Diagnostics
//!
//! Decoding is best-effort: a bad token or entry is reported as a
//! [`DecodeIssue`] and skipped, the rest of the record still loads.
use thiserror::Error;

use crate::item::SignatureError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeIssue {
    #[error("Empty inventory token")]
    EmptyToken,

    #[error("Token '{token}' has no ':', ';' or '#' after the kind")]
    MissingDelimiter { token: String },

    #[error("Token '{token}' has an invalid kind: {source}")]
    InvalidKind {
        token: String,
        #[source]
        source: SignatureError,
    },

    #[error("Entry '{entry}' of kind '{kind}' is not '<variant>:<quantity>'")]
    MalformedEntry { kind: String, entry: String },

    #[error("Entry '{entry}' of kind '{kind}' has a non-numeric quantity")]
    InvalidQuantity { kind: String, entry: String },

    #[error("Entry '{entry}' of kind '{kind}' has a zero quantity")]
    ZeroQuantity { kind: String, entry: String },

    #[error("Entry '{entry}' of kind '{kind}' would overflow the stored quantity")]
    QuantityOverflow { kind: String, entry: String },

    #[error("Entry '{entry}' of kind '{kind}' has an invalid variant: {reason}")]
    InvalidVariant { kind: String, entry: String, reason: String },
}

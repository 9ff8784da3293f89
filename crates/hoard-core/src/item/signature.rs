use std::fmt;
use std::str::FromStr;

use crate::item::error::SignatureError;

/// Characters that carry meaning in the persisted token grammar.
pub const RESERVED_CHARS: [char; 4] = [':', ';', ',', '#'];

fn reserved_char(s: &str) -> Option<char> {
    s.chars()
        .find(|c| RESERVED_CHARS.contains(c) || c.is_whitespace())
}

/// Type identity of an item, independent of variant data and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKind(String);

impl ItemKind {
    /// Create a kind from its canonical name
    pub fn new(name: impl Into<String>) -> Result<Self, SignatureError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SignatureError::EmptyKind);
        }
        if let Some(character) = reserved_char(&name) {
            return Err(SignatureError::ReservedInKind { kind: name, character });
        }
        Ok(Self(name))
    }

    /// Canonical name, also the primary sort key for projections
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemKind {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Ordered field list of a structured variant (e.g. an effect descriptor).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectFields(Vec<String>);

impl EffectFields {
    pub fn new<I, S>(fields: I) -> Result<Self, SignatureError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(SignatureError::NoFields);
        }
        for field in &fields {
            if let Some(character) = reserved_char(field) {
                return Err(SignatureError::ReservedInField { field: field.clone(), character });
            }
        }
        Ok(Self(fields))
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for EffectFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(";"))
    }
}

/// Everything that makes two batches of one kind non-interchangeable.
///
/// The derived ordering (`Plain < Scalar < Structured`, then by payload) is
/// the tie-break between signatures of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    /// No intrinsic variant state
    Plain,
    /// A single integer such as a durability value
    Scalar(i64),
    /// Multi-field descriptor such as a potion effect
    Structured(EffectFields),
}

/// Sub-format a variant is persisted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariantClass {
    Plain,
    Scalar,
    Structured,
}

impl Variant {
    pub fn class(&self) -> VariantClass {
        match self {
            Variant::Plain => VariantClass::Plain,
            Variant::Scalar(_) => VariantClass::Scalar,
            Variant::Structured(_) => VariantClass::Structured,
        }
    }
}

/// Canonical identity of an item batch: kind plus variant, never quantity.
///
/// Two signatures are equal exactly when the kinds are identical and the
/// variant data is equal, so the type is usable directly as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemSignature {
    kind: ItemKind,
    variant: Variant,
}

impl ItemSignature {
    pub fn new(kind: ItemKind, variant: Variant) -> Self {
        Self { kind, variant }
    }

    /// Signature of a kind without variant state
    pub fn plain(kind: ItemKind) -> Self {
        Self::new(kind, Variant::Plain)
    }

    /// Signature carrying a scalar variant such as durability
    pub fn scalar(kind: ItemKind, value: i64) -> Self {
        Self::new(kind, Variant::Scalar(value))
    }

    /// Signature carrying a structured descriptor
    pub fn structured(kind: ItemKind, fields: EffectFields) -> Self {
        Self::new(kind, Variant::Structured(fields))
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }
}

impl fmt::Display for ItemSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Variant::Plain => write!(f, "{}", self.kind),
            Variant::Scalar(value) => write!(f, "{};{}", self.kind, value),
            Variant::Structured(fields) => write!(f, "{}#{}", self.kind, fields),
        }
    }
}

/// A quantity of one signature handed to or taken from a storage unit.
///
/// Quantities are not bounded by the kind's batch size here; bounding only
/// happens when the store is projected onto display slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemBatch {
    pub signature: ItemSignature,
    pub quantity: u64,
}

impl ItemBatch {
    pub fn new(signature: ItemSignature, quantity: u64) -> Self {
        Self { signature, quantity }
    }

    pub fn plain(kind: ItemKind, quantity: u64) -> Self {
        Self::new(ItemSignature::plain(kind), quantity)
    }
}

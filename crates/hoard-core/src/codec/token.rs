use crate::codec::error::DecodeIssue;
use crate::inventory::ConsolidatedStore;
use crate::item::{EffectFields, ItemKind, ItemSignature, Variant, VariantClass};

const PLAIN_DELIM: char = ':';
const SCALAR_DELIM: char = ';';
const STRUCTURED_DELIM: char = '#';
const ENTRY_SEP: char = ',';
const FIELD_SEP: char = ';';
const QUANTITY_SEP: char = ':';

/// Result of decoding one record's token list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedStore {
    pub store: ConsolidatedStore,
    /// Everything that was skipped, in encounter order
    pub issues: Vec<DecodeIssue>,
}

/// Encode a store as one token per (kind, variant class) group.
///
/// - `KIND:qty` for plain entries
/// - `KIND;v1:q1,v2:q2` for scalar variants
/// - `KIND#f1;f2:q1,f1;f3:q2` for structured variants
///
/// The store iterates in canonical order, so each group is contiguous and
/// the output is deterministic.
pub fn encode_store(store: &ConsolidatedStore) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current: Option<(&ItemKind, VariantClass, String)> = None;

    for (signature, quantity) in store.iter() {
        let kind = signature.kind();
        let class = signature.variant().class();

        let continues = matches!(&current, Some((k, c, _)) if *k == kind && *c == class);
        if continues {
            if let Some((_, _, token)) = current.as_mut() {
                token.push(ENTRY_SEP);
                push_entry(token, signature.variant(), quantity);
            }
            continue;
        }

        if let Some((_, _, token)) = current.take() {
            tokens.push(token);
        }
        let mut token = String::from(kind.as_str());
        token.push(match class {
            VariantClass::Plain => PLAIN_DELIM,
            VariantClass::Scalar => SCALAR_DELIM,
            VariantClass::Structured => STRUCTURED_DELIM,
        });
        push_entry(&mut token, signature.variant(), quantity);
        current = Some((kind, class, token));
    }

    if let Some((_, _, token)) = current {
        tokens.push(token);
    }
    tokens
}

fn push_entry(token: &mut String, variant: &Variant, quantity: u64) {
    match variant {
        Variant::Plain => {}
        Variant::Scalar(value) => {
            token.push_str(&value.to_string());
            token.push(QUANTITY_SEP);
        }
        Variant::Structured(fields) => {
            token.push_str(&fields.to_string());
            token.push(QUANTITY_SEP);
        }
    }
    token.push_str(&quantity.to_string());
}

/// Decode a record's tokens, skipping and logging anything malformed.
pub fn decode_tokens<I, S>(tokens: I) -> DecodedStore
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut decoded = DecodedStore::default();
    for token in tokens {
        let (entries, mut issues) = decode_token(token.as_ref());
        for (signature, quantity) in entries {
            // Corrupt records can claim more than a u64 ledger holds
            if decoded.store.total().checked_add(quantity).is_none() {
                issues.push(DecodeIssue::QuantityOverflow {
                    kind: signature.kind().to_string(),
                    entry: format!("{}:{}", signature, quantity),
                });
                continue;
            }
            decoded.store.add(signature, quantity);
        }
        for issue in issues {
            log::warn!("Skipping inventory entry: {}", issue);
            decoded.issues.push(issue);
        }
    }
    decoded
}

/// Decode a single token into `(signature, quantity)` triples.
///
/// Bad entries inside a multi-entry token are skipped individually.
pub fn decode_token(token: &str) -> (Vec<(ItemSignature, u64)>, Vec<DecodeIssue>) {
    let token = token.trim();
    if token.is_empty() {
        return (Vec::new(), vec![DecodeIssue::EmptyToken]);
    }

    let Some(split) = token.find([PLAIN_DELIM, SCALAR_DELIM, STRUCTURED_DELIM]) else {
        return (Vec::new(), vec![DecodeIssue::MissingDelimiter { token: token.to_string() }]);
    };
    let (kind_name, rest) = token.split_at(split);
    let kind = match ItemKind::new(kind_name) {
        Ok(kind) => kind,
        Err(source) => {
            return (Vec::new(), vec![DecodeIssue::InvalidKind { token: token.to_string(), source }]);
        }
    };

    // Delimiters are ASCII, so the first byte is the whole char
    let delimiter = rest.as_bytes()[0] as char;
    let body = &rest[1..];

    let mut entries = Vec::new();
    let mut issues = Vec::new();

    if delimiter == PLAIN_DELIM {
        match parse_quantity(&kind, token, body) {
            Ok(quantity) => entries.push((ItemSignature::plain(kind), quantity)),
            Err(issue) => issues.push(issue),
        }
        return (entries, issues);
    }

    for entry in body.split(ENTRY_SEP) {
        let Some((variant_text, quantity_text)) = entry.rsplit_once(QUANTITY_SEP) else {
            issues.push(DecodeIssue::MalformedEntry { kind: kind.to_string(), entry: entry.to_string() });
            continue;
        };
        let variant = if delimiter == SCALAR_DELIM {
            parse_scalar(&kind, entry, variant_text)
        } else {
            parse_structured(&kind, entry, variant_text)
        };
        let parsed = variant.and_then(|variant| {
            parse_quantity(&kind, entry, quantity_text).map(|quantity| (variant, quantity))
        });
        match parsed {
            Ok((variant, quantity)) => entries.push((ItemSignature::new(kind.clone(), variant), quantity)),
            Err(issue) => issues.push(issue),
        }
    }

    (entries, issues)
}

fn parse_quantity(kind: &ItemKind, entry: &str, text: &str) -> Result<u64, DecodeIssue> {
    let quantity: u64 = text.trim().parse().map_err(|_| DecodeIssue::InvalidQuantity {
        kind: kind.to_string(),
        entry: entry.to_string(),
    })?;
    if quantity == 0 {
        return Err(DecodeIssue::ZeroQuantity { kind: kind.to_string(), entry: entry.to_string() });
    }
    Ok(quantity)
}

fn parse_scalar(kind: &ItemKind, entry: &str, text: &str) -> Result<Variant, DecodeIssue> {
    text.trim()
        .parse::<i64>()
        .map(Variant::Scalar)
        .map_err(|e| DecodeIssue::InvalidVariant {
            kind: kind.to_string(),
            entry: entry.to_string(),
            reason: e.to_string(),
        })
}

fn parse_structured(kind: &ItemKind, entry: &str, text: &str) -> Result<Variant, DecodeIssue> {
    EffectFields::new(text.split(FIELD_SEP))
        .map(Variant::Structured)
        .map_err(|e| DecodeIssue::InvalidVariant {
            kind: kind.to_string(),
            entry: entry.to_string(),
            reason: e.to_string(),
        })
}

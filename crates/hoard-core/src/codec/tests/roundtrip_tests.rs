use proptest::prelude::*;

use crate::codec::{decode_tokens, encode_store};
use crate::inventory::ConsolidatedStore;
use crate::item::{EffectFields, ItemKind, ItemSignature, Variant};

fn arb_kind() -> impl Strategy<Value = ItemKind> {
    "[A-Z][A-Z_]{0,11}".prop_map(|name| ItemKind::new(name).unwrap())
}

fn arb_variant() -> impl Strategy<Value = Variant> {
    prop_oneof![
        Just(Variant::Plain),
        any::<i64>().prop_map(Variant::Scalar),
        prop::collection::vec("[a-zA-Z0-9_.]{0,6}", 1..4)
            .prop_map(|fields| Variant::Structured(EffectFields::new(fields).unwrap())),
    ]
}

fn arb_store() -> impl Strategy<Value = ConsolidatedStore> {
    prop::collection::vec((arb_kind(), arb_variant(), 1u64..=u64::MAX / 64), 0..24).prop_map(|entries| {
        ConsolidatedStore::from_entries(
            entries
                .into_iter()
                .map(|(kind, variant, quantity)| (ItemSignature::new(kind, variant), quantity)),
        )
    })
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(store in arb_store()) {
        let tokens = encode_store(&store);
        let decoded = decode_tokens(&tokens);
        prop_assert!(decoded.issues.is_empty(), "issues: {:?}", decoded.issues);
        prop_assert_eq!(decoded.store, store);
    }

    #[test]
    fn prop_encode_is_deterministic(store in arb_store()) {
        prop_assert_eq!(encode_store(&store), encode_store(&store.clone()));
    }
}


#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use crate::item::{BatchLimits, BatchTable, ItemBatch, ItemKind, ItemSignature};

    pub fn kind(name: &str) -> ItemKind {
        ItemKind::new(name).expect("valid kind")
    }

    pub fn plain(name: &str) -> ItemSignature {
        ItemSignature::plain(kind(name))
    }

    pub fn batch(name: &str, quantity: u64) -> ItemBatch {
        ItemBatch::plain(kind(name), quantity)
    }

    /// 64 by default, swords do not stack, pearls stack to 16
    pub fn limits() -> Arc<dyn BatchLimits> {
        Arc::new(
            BatchTable::new(64)
                .with_limit(kind("SWORD"), 1)
                .with_limit(kind("ENDER_PEARL"), 16),
        )
    }
}

use std::collections::BTreeMap;

use hoard_core::inventory::DisplayBatch;
use hoard_core::registry::StorageUnit;

/// One line per unit for `hoard inspect`
pub fn unit_line(unit: &StorageUnit) -> String {
    let metrics = unit.inventory().metrics();
    format!(
        "{}  {:<12} {:<24} stack {:>3}  slots {:>4}/{:<4} items {}",
        unit.id(),
        unit.entity_kind(),
        unit.location().to_string(),
        unit.stack_size(),
        metrics.used_slots,
        metrics.max_slots,
        metrics.total_items
    )
}

/// Slot listing for `hoard page`
pub fn page_lines(page: &BTreeMap<u32, DisplayBatch>) -> Vec<String> {
    if page.is_empty() {
        return vec!["  (empty page)".to_string()];
    }
    page.iter()
        .map(|(slot, batch)| format!("  [{:>2}] {} x{}", slot, batch.signature, batch.count))
        .collect()
}

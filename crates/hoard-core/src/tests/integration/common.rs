use std::path::Path;

use crate::item::{ItemBatch, ItemKind, ItemSignature};
use crate::kernel::Application;
use crate::registry::Location;

pub fn kind(name: &str) -> ItemKind {
    ItemKind::new(name).expect("valid kind")
}

pub fn plain(name: &str, quantity: u64) -> ItemBatch {
    ItemBatch::plain(kind(name), quantity)
}

pub fn scalar(name: &str, value: i64, quantity: u64) -> ItemBatch {
    ItemBatch::new(ItemSignature::scalar(kind(name), value), quantity)
}

pub fn loc(x: i32) -> Location {
    Location::new("world", x, 64, 0)
}

/// Write an engine config with a short flush interval and the test's
/// batch limits, then build, initialize and start an application.
pub async fn started_app(root: &Path, flush_interval_secs: u64) -> Application {
    std::fs::create_dir_all(root.join("config")).expect("config dir");
    std::fs::write(
        root.join("config/engine.yml"),
        format!(
            "slots_per_page: 45\nflush_interval_secs: {}\ndefault_max_batch: 64\nmax_batch_overrides:\n  SWORD: 1\n  ENDER_PEARL: 16\n",
            flush_interval_secs
        ),
    )
    .expect("engine config");

    let mut app = Application::new(root).await.expect("application");
    app.initialize().await.expect("initialize");
    app.start().await.expect("start");
    app
}

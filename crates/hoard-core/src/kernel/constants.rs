/// Application name
pub const APP_NAME: &str = "hoard";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Record format version written to new records
pub const DATA_VERSION: u32 = 1;

/// Configuration directory, relative to the data root
pub const CONFIG_DIR: &str = "config";

/// Name of the engine configuration document
pub const ENGINE_CONFIG_NAME: &str = "engine";

/// Default record directory, relative to the data root
pub const RECORDS_DIR: &str = "spawners";

/// Extension of record files
pub const RECORD_EXTENSION: &str = "yml";

/// Max batch size for kinds without an override
pub const DEFAULT_MAX_BATCH: u32 = 64;

/// Display slots per GUI page (a 5-row chest)
pub const DEFAULT_SLOTS_PER_PAGE: u32 = 45;

/// Seconds between batched flushes of modified units
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 60;

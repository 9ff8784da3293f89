//! # Hoard Storage
//!
//! Disk access and configuration for the engine.
//!
//! - [`StorageProvider`]: the file operations the engine needs, rooted at a
//!   base directory. [`LocalStorageProvider`] writes atomically through a
//!   temp file.
//! - [`ConfigManager`] / [`ConfigData`]: named JSON/YAML/TOML documents.
//! - [`EngineConfig`]: typed engine tunables read from the `engine` document.
pub mod config;
pub mod engine;
pub mod error;
pub mod local;
pub mod provider;

pub use config::{ConfigData, ConfigFormat, ConfigManager};
pub use engine::EngineConfig;
pub use error::StorageSystemError;
pub use local::LocalStorageProvider;
pub use provider::StorageProvider;

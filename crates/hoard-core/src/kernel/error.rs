//! # Hoard Core Errors
//!
//! Crate-wide error type.
//!
//! [`Error`] aggregates the typed per-subsystem errors ([`StorageSystemError`],
//! [`RegistryError`], [`SignatureError`]) and adds lifecycle failures raised
//! while the [`Application`](crate::kernel::Application) drives its
//! components through their phases.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::item::SignatureError;
use crate::registry::RegistryError;
use crate::storage::error::StorageSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Disk access, config documents and record (de)serialization
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Invalid item signature: {0}")]
    Signature(#[from] SignatureError),

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase:?}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        component_name: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Bootstrap")]
    Bootstrap,
    #[error("Initialize")]
    Initialize,
    #[error("Start")]
    Start,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// I/O error with the failed operation and the path it touched
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::Io {
            source,
            operation: operation.into(),
            path,
        })
    }

    pub(crate) fn lifecycle(
        phase: KernelLifecyclePhase,
        component_name: &str,
        message: impl Into<String>,
        source: Option<Error>,
    ) -> Self {
        Error::KernelLifecycleError {
            phase,
            component_name: Some(component_name.to_string()),
            message: message.into(),
            source: source.map(Box::new),
        }
    }
}

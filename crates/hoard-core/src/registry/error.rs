use thiserror::Error;

use crate::persistence::UnitId;
use crate::registry::unit::Location;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Storage unit '{0}' not found")]
    UnitNotFound(UnitId),

    #[error("Location {location} is already occupied by storage unit '{existing}'")]
    LocationOccupied { location: Location, existing: UnitId },

    #[error("Storage unit '{0}' is already registered")]
    DuplicateUnit(UnitId),

    #[error("Invalid stack size {0}, must be at least 1")]
    InvalidStackSize(u32),

    #[error("Invalid world name '{0}'")]
    InvalidWorld(String),

    #[error("Adding items to storage unit '{0}' would overflow its item total")]
    QuantityOverflow(UnitId),

    #[error("Invalid entity kind '{0}'")]
    InvalidEntityKind(String),

    #[error("Malformed {field} in record: {message}")]
    MalformedRecord { field: &'static str, message: String },
}

impl RegistryError {
    pub(crate) fn malformed(field: &'static str, message: impl Into<String>) -> Self {
        RegistryError::MalformedRecord {
            field,
            message: message.into(),
        }
    }
}

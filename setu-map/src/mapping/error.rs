//! Error types for the mapping orchestrator.

use thiserror::Error;

use crate::config::ConfigLoadError;
use crate::io::PersistError;
use crate::sync::SyncError;
use crate::volume::VolumeError;

/// Mapping error type
#[derive(Error, Debug)]
pub enum MappingError {
    /// Rejected configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    /// Fusion engine failure
    #[error("Volume error: {0}")]
    Volume(#[from] VolumeError),

    /// Malformed or unencodable sync payload
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Global map save/load failure
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;

use thiserror::Error;

use super::config::ConfigError;
use super::sink::SinkError;
use crate::core::observables::registry::{BinIndex, RegistryError};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Observable registration failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Invalid output configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to commit energy frame: {0}")]
    Sink(#[from] SinkError),

    #[error("Failed to write log output: {0}")]
    Io(#[from] std::io::Error),

    #[error("No observable is registered for slot {0}")]
    UnknownSlot(BinIndex),
}

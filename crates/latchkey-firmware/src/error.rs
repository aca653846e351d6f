//! Error types for the firmware crate.

use std::path::PathBuf;

/// Result type alias for firmware operations.
pub type Result<T> = std::result::Result<T, FirmwareError>;

/// Errors surfaced by configuration loading and the decision loop.
///
/// Driver faults during normal operation are logged and absorbed by the
/// loop; only setup problems and broken invariants reach callers.
#[derive(Debug, thiserror::Error)]
pub enum FirmwareError {
    /// Identifier, scheduling, state or configuration error.
    #[error(transparent)]
    Core(#[from] latchkey_core::Error),

    /// Configuration file could not be read.
    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`FirmwareConfig`](crate::FirmwareConfig).
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_is_transparent() {
        let error = FirmwareError::from(latchkey_core::Error::Config("tick".to_string()));
        assert_eq!(error.to_string(), "Configuration error: tick");
    }

    #[test]
    fn test_config_read_error_names_path() {
        let error = FirmwareError::ConfigRead {
            path: PathBuf::from("/etc/latchkey.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(error.to_string().contains("/etc/latchkey.toml"));
    }
}

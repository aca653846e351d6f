//! Error types for hardware operations.
//!
//! This module defines error types specific to peripheral driver calls:
//! reader communication and card reads, indicator and tone output, and the
//! lock relay.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Card selection or serial read failed.
    #[error("Card read error: {message}")]
    CardReadError { message: String },

    /// Output driver (indicator, tone, relay) rejected a command.
    #[error("Output error on {device}: {message}")]
    OutputError { device: String, message: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new card read error.
    pub fn card_read(message: impl Into<String>) -> Self {
        Self::CardReadError {
            message: message.into(),
        }
    }

    /// Create a new output error.
    pub fn output(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OutputError {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Whether the failure is expected to clear on the next poll.
    ///
    /// Card read failures happen whenever a card leaves the field mid-read;
    /// the card is simply presented again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CardReadError { .. } | Self::CommunicationError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("MFRC522");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: MFRC522");
    }

    #[test]
    fn test_card_read_error() {
        let error = HardwareError::card_read("collision");
        assert_eq!(error.to_string(), "Card read error: collision");
        assert!(error.is_transient());
    }

    #[test]
    fn test_output_error() {
        let error = HardwareError::output("buzzer", "PWM channel busy");
        assert_eq!(error.to_string(), "Output error on buzzer: PWM channel busy");
        assert!(!error.is_transient());
    }
}

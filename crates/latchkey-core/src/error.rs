use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Identifier errors
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Identifier length must be {min}-{max} bytes, got {actual}")]
    IdentifierLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    // Scheduling errors
    #[error("Repeat interval for slot {slot} must be non-zero")]
    ZeroInterval { slot: String },

    #[error("Deadline for slot {slot} is out of range")]
    DeadlineOverflow { slot: String },

    // Decision loop errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_length_message() {
        let error = Error::IdentifierLength {
            min: 4,
            max: 10,
            actual: 12,
        };
        assert_eq!(
            error.to_string(),
            "Identifier length must be 4-10 bytes, got 12"
        );
    }

    #[test]
    fn test_state_transition_message() {
        let error = Error::InvalidStateTransition {
            from: "Idle".to_string(),
            to: "Authorized".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid state transition from Idle to Authorized"
        );
    }

    #[test]
    fn test_deadline_overflow_message() {
        let error = Error::DeadlineOverflow {
            slot: "relay".to_string(),
        };
        assert_eq!(error.to_string(), "Deadline for slot relay is out of range");
    }
}

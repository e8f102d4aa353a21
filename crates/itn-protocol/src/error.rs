//! Protocol error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Empty response frame")]
    EmptyFrame,

    #[error("Response frame is not valid ASCII text")]
    InvalidEncoding,

    #[error("Measurement response too short: expected at least {expected} characters, got {actual}")]
    MeasurementTooShort { expected: usize, actual: usize },

    #[error("Unable to parse measurement '{0}' as a decimal number")]
    InvalidMeasurement(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::MeasurementTooShort {
            expected: 4,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Measurement response too short: expected at least 4 characters, got 2"
        );
    }

    #[test]
    fn test_invalid_measurement_display() {
        let err = ProtocolError::InvalidMeasurement("1A.x".to_string());
        assert_eq!(
            err.to_string(),
            "Unable to parse measurement '1A.x' as a decimal number"
        );
    }
}

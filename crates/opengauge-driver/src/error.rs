//! Driver error types.

use opengauge_usb_common::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("No response from instrument within {timeout_ms}ms")]
    ResponseTimeout { timeout_ms: u64 },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type DriverResult<T> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = DriverError::ResponseTimeout { timeout_ms: 500 };
        assert_eq!(err.to_string(), "No response from instrument within 500ms");
    }

    #[test]
    fn test_transport_passthrough() {
        let err: DriverError = TransportError::Disconnected.into();
        assert_eq!(err.to_string(), "Device disconnected");
    }
}

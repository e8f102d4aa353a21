//! USB transport capability for OpenGauge instrument drivers.
//!
//! This crate isolates everything that touches the bus: the
//! [`GaugeTransport`] trait the driver polls through, a mock implementation
//! for tests, and the `rusb`-backed production transport with the USB-ITN
//! setup sequence.

pub mod transport;
pub mod usb;

pub use transport::*;
pub use usb::UsbItnTransport;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: vendor=0x{vendor_id:04X} product=0x{product_id:04X}")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    #[error("Failed to open device: {0}")]
    OpenFailed(String),

    #[error("Failed to configure device: {0}")]
    SetupFailed(String),

    #[error("No interrupt IN endpoint on the claimed interface")]
    EndpointNotFound,

    #[error("Failed to write to device: {0}")]
    WriteFailed(String),

    #[error("Failed to read from device: {0}")]
    ReadFailed(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransportError::DeviceNotFound {
            vendor_id: 0x0FE7,
            product_id: 0x4001,
        };
        assert_eq!(
            format!("{}", err),
            "Device not found: vendor=0x0FE7 product=0x4001"
        );

        let err = TransportError::Disconnected;
        assert_eq!(format!("{}", err), "Device disconnected");
    }
}

//! Command framing.
//!
//! Commands are short ASCII strings sent to the instrument as the payload of
//! a vendor control transfer, always ending in a single carriage return.

use crate::frame::FRAME_TERMINATOR;

/// Command character requesting the current measurement value.
const READ_COMMAND: &str = "1";

/// Command character requesting the device identification string.
const DEVICE_INFO_COMMAND: &str = "V";

/// A framed command ready for transmission.
///
/// Construction normalizes the terminator: a command that already ends with
/// the carriage return is left untouched, so normalization is idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    bytes: Vec<u8>,
}

impl Command {
    /// Frame arbitrary command text, appending the terminator when missing.
    pub fn from_text(text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        if bytes.last() != Some(&FRAME_TERMINATOR) {
            bytes.push(FRAME_TERMINATOR);
        }
        Self { bytes }
    }

    /// Request the current measurement.
    pub fn request_reading() -> Self {
        Self::from_text(READ_COMMAND)
    }

    /// Request the device identification string.
    pub fn request_device_info() -> Self {
        Self::from_text(DEVICE_INFO_COMMAND)
    }

    /// Wire form of the command, terminator included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

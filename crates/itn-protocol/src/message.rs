//! Response message decoding.
//!
//! Every response frame is ASCII text. The first character is a type tag:
//! `'0'` measurement, `'1'` device identification, `'9'` status. Measurement
//! payloads carry a fixed two-character sub-header ahead of a decimal number
//! string; the other payloads are opaque text.

use tracing::debug;

use crate::error::{ProtocolError, ProtocolResult};

const DATA_TAG: char = '0';
const DEVICE_INFO_TAG: char = '1';
const STATUS_TAG: char = '9';

/// Fixed sub-header between the measurement tag and the number string.
/// Observed as `"1A"` on current firmware; its content is ignored.
const DATA_SUBHEADER_LEN: usize = 2;

/// Minimum measurement payload: sub-header plus at least one number digit
/// and a sign or second digit.
const MIN_DATA_LEN: usize = 4;

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A numeric measurement, already passed through the unit scale.
    Measurement(f64),
    /// Device identification text.
    DeviceInfo(String),
    /// Device status text.
    Status(String),
    /// A frame with an unknown tag; reported and dropped downstream.
    Unrecognized(String),
}

/// Display-unit scaling applied to measurement values before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitScale {
    /// Pass values through as reported by the instrument (millimetres).
    #[default]
    Millimeters,
    /// Report whole micrometres: multiply by 1000 and round.
    Micrometers,
}

impl UnitScale {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Millimeters => value,
            Self::Micrometers => (value * 1000.0).round(),
        }
    }
}

/// Classifies frames by tag and parses the type-specific payload.
///
/// The unit scale is per-decoder configuration, fixed at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageDecoder {
    scale: UnitScale,
}

impl MessageDecoder {
    pub fn new(scale: UnitScale) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> UnitScale {
        self.scale
    }

    /// Decode one terminator-stripped frame.
    ///
    /// An unknown tag is not an error: the frame decodes to
    /// [`Message::Unrecognized`] and the caller decides how loudly to drop
    /// it. Errors are reserved for frames that cannot be interpreted at all
    /// (empty, non-ASCII) or measurement payloads that fail to parse.
    pub fn decode(&self, frame: &[u8]) -> ProtocolResult<Message> {
        let text = std::str::from_utf8(frame).map_err(|_| ProtocolError::InvalidEncoding)?;
        if !text.is_ascii() {
            return Err(ProtocolError::InvalidEncoding);
        }
        let mut chars = text.chars();
        let tag = chars.next().ok_or(ProtocolError::EmptyFrame)?;
        let payload = chars.as_str();

        match tag {
            DATA_TAG => self.decode_measurement(payload),
            DEVICE_INFO_TAG => {
                debug!("Received device info response: {}", payload);
                Ok(Message::DeviceInfo(payload.to_string()))
            }
            STATUS_TAG => {
                debug!("Received status response: {}", payload);
                Ok(Message::Status(payload.to_string()))
            }
            _ => Ok(Message::Unrecognized(text.to_string())),
        }
    }

    fn decode_measurement(&self, payload: &str) -> ProtocolResult<Message> {
        if payload.len() < MIN_DATA_LEN {
            return Err(ProtocolError::MeasurementTooShort {
                expected: MIN_DATA_LEN,
                actual: payload.len(),
            });
        }

        let number = &payload[DATA_SUBHEADER_LEN..];
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| ProtocolError::InvalidMeasurement(number.to_string()))?;

        let scaled = self.scale.apply(value);
        debug!("Received measurement {} (scaled: {})", value, scaled);
        Ok(Message::Measurement(scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_measurement_millimeters() {
        let decoder = MessageDecoder::new(UnitScale::Millimeters);
        let msg = decoder.decode(b"01A12.34").expect("decode should succeed");
        assert_eq!(msg, Message::Measurement(12.34));
    }

    #[test]
    fn test_decode_measurement_micrometers() {
        let decoder = MessageDecoder::new(UnitScale::Micrometers);
        let msg = decoder.decode(b"01A12.34").expect("decode should succeed");
        assert_eq!(msg, Message::Measurement(12340.0));
    }

    #[test]
    fn test_decode_measurement_signed() {
        let decoder = MessageDecoder::new(UnitScale::Millimeters);
        let msg = decoder
            .decode(b"01A+00012.34")
            .expect("decode should succeed");
        assert_eq!(msg, Message::Measurement(12.34));

        let msg = decoder.decode(b"01A-0.05").expect("decode should succeed");
        assert_eq!(msg, Message::Measurement(-0.05));
    }

    #[test]
    fn test_decode_measurement_minimum_length() {
        let decoder = MessageDecoder::default();
        let msg = decoder.decode(b"01A77").expect("decode should succeed");
        assert_eq!(msg, Message::Measurement(77.0));
    }

    #[test]
    fn test_decode_measurement_too_short() {
        let decoder = MessageDecoder::default();
        let result = decoder.decode(b"0AB");
        assert!(matches!(
            result,
            Err(ProtocolError::MeasurementTooShort {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_decode_measurement_not_a_number() {
        let decoder = MessageDecoder::default();
        let result = decoder.decode(b"01Atwelve");
        assert!(matches!(result, Err(ProtocolError::InvalidMeasurement(_))));
    }

    #[test]
    fn test_decode_device_info_passthrough() {
        let decoder = MessageDecoder::default();
        let msg = decoder.decode(b"1IT-012AB").expect("decode should succeed");
        assert_eq!(msg, Message::DeviceInfo("IT-012AB".to_string()));
    }

    #[test]
    fn test_decode_status_passthrough() {
        let decoder = MessageDecoder::default();
        let msg = decoder.decode(b"91").expect("decode should succeed");
        assert_eq!(msg, Message::Status("1".to_string()));
    }

    #[test]
    fn test_decode_unrecognized_tag() {
        let decoder = MessageDecoder::default();
        let msg = decoder.decode(b"Zfoo").expect("decode should succeed");
        assert_eq!(msg, Message::Unrecognized("Zfoo".to_string()));
    }

    #[test]
    fn test_decode_empty_frame() {
        let decoder = MessageDecoder::default();
        assert!(matches!(decoder.decode(b""), Err(ProtocolError::EmptyFrame)));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let decoder = MessageDecoder::default();
        let result = decoder.decode(&[0x30, 0xFF, 0xFE, 0x31, 0x32]);
        assert!(matches!(result, Err(ProtocolError::InvalidEncoding)));
    }

    #[test]
    fn test_decode_non_ascii_text() {
        let decoder = MessageDecoder::default();
        let result = decoder.decode("0£1A2.3".as_bytes());
        assert!(matches!(result, Err(ProtocolError::InvalidEncoding)));
    }

    #[test]
    fn test_unit_scale_apply() {
        assert_eq!(UnitScale::Millimeters.apply(12.34), 12.34);
        assert_eq!(UnitScale::Micrometers.apply(12.34), 12340.0);
        assert_eq!(UnitScale::Micrometers.apply(-0.0005), -1.0);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(500))]

        #[test]
        fn prop_decode_never_panics(ref frame in any::<Vec<u8>>()) {
            let decoder = MessageDecoder::default();
            let _ = decoder.decode(frame);
        }

        #[test]
        fn prop_measurement_roundtrip_millimeters(value in -9999.999f64..9999.999f64) {
            let decoder = MessageDecoder::new(UnitScale::Millimeters);
            let number = format!("{value:+09.3}");
            let wire = format!("01A{number}");
            let expected: f64 = number.parse().expect("formatted number parses");
            let msg = decoder.decode(wire.as_bytes()).expect("decode should succeed");
            prop_assert_eq!(msg, Message::Measurement(expected));
        }

        #[test]
        fn prop_micrometers_always_integral(value in -999.999f64..999.999f64) {
            let scaled = UnitScale::Micrometers.apply(value);
            prop_assert_eq!(scaled, scaled.round());
        }
    }
}

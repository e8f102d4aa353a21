//! Mitutoyo USB-ITN "Digimatic" ASCII protocol implementation.
//!
//! This crate is intentionally I/O-free. It provides the receive-side frame
//! accumulator, command framing, and response decoding as pure types that can
//! be tested and fuzzed without hardware or USB plumbing.
//!
//! The instrument speaks a line protocol: the host sends single-character
//! ASCII commands, the instrument answers with carriage-return-terminated
//! ASCII frames whose first character tags the message kind. Responses arrive
//! on an interrupt IN endpoint in arbitrarily-sized packets that do not align
//! with frame boundaries, which is why accumulation and delimiting live here
//! rather than in the transport.
//!
//! # Key Features
//! - Bounded FIFO receive accumulation with frame extraction
//! - Command normalization (terminator handling is idempotent)
//! - Typed decoding of measurement, device-info, and status responses
//! - Display-unit scaling for measurement values

pub mod command;
pub mod error;
pub mod frame;
pub mod ids;
pub mod message;

pub use command::Command;
pub use error::{ProtocolError, ProtocolResult};
pub use frame::{FRAME_TERMINATOR, FrameAccumulator, RX_BUFFER_CAPACITY};
pub use ids::{MITUTOYO_VENDOR_ID, USB_ITN_PRODUCT_ID};
pub use message::{Message, MessageDecoder, UnitScale};

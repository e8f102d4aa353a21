//! Poll-cycle driver for Mitutoyo USB-ITN instruments.
//!
//! The driver owns all protocol state — receive accumulation, the pending
//! request, last-known-value caches — and borrows a
//! [`GaugeTransport`](opengauge_usb_common::GaugeTransport) from the caller
//! for each operation. There is no background thread: the caller polls, and
//! everything dispatches synchronously on the polling thread.

pub mod clock;
pub mod driver;
pub mod error;
pub mod sink;
pub mod tracker;

pub use clock::{Clock, MonotonicClock};
pub use driver::{DriverConfig, GaugeDriver};
pub use error::{DriverError, DriverResult};
pub use sink::GaugeSink;
pub use tracker::RequestTracker;

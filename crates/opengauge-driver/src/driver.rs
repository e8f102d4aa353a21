//! The poll-cycle driver.
//!
//! Each cycle: one bounded transport read, accumulate, drain every complete
//! frame (decode, dispatch, clear the pending request), then check the
//! response deadline. The synchronous read operations are explicit bounded
//! busy-poll loops over that cycle.

use std::time::Duration;

use opengauge_itn_protocol::{Command, FrameAccumulator, Message, MessageDecoder, UnitScale};
use opengauge_usb_common::GaugeTransport;
use tracing::{debug, error, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::error::{DriverError, DriverResult};
use crate::sink::GaugeSink;
use crate::tracker::RequestTracker;

/// Driver tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Hardware timeout for each interrupt read.
    pub read_timeout: Duration,
    /// How long a command may wait for its response frame. Also bounds the
    /// synchronous read operations.
    pub response_timeout: Duration,
    /// Sleep between poll cycles in the synchronous operations.
    pub poll_interval: Duration,
    /// Unit scaling applied to measurement values.
    pub unit_scale: UnitScale,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(10),
            response_timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(20),
            unit_scale: UnitScale::Millimeters,
        }
    }
}

impl DriverConfig {
    #[must_use]
    pub fn with_unit_scale(mut self, scale: UnitScale) -> Self {
        self.unit_scale = scale;
        self
    }

    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Driver instance for one instrument.
///
/// Owns every piece of mutable protocol state; the transport stays with the
/// caller and is lent to each operation. Not designed for concurrent access:
/// one instrument, one driver, one logical sequence of calls.
pub struct GaugeDriver<C: Clock = MonotonicClock> {
    config: DriverConfig,
    clock: C,
    accumulator: FrameAccumulator,
    decoder: MessageDecoder,
    tracker: RequestTracker,
    sink: Option<Box<dyn GaugeSink>>,
    last_measurement: Option<f64>,
    device_info: Option<String>,
}

impl GaugeDriver<MonotonicClock> {
    pub fn new(config: DriverConfig) -> Self {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> GaugeDriver<C> {
    pub fn with_clock(config: DriverConfig, clock: C) -> Self {
        Self {
            decoder: MessageDecoder::new(config.unit_scale),
            config,
            clock,
            accumulator: FrameAccumulator::new(),
            tracker: RequestTracker::new(),
            sink: None,
            last_measurement: None,
            device_info: None,
        }
    }

    /// Register the message sink, replacing any previous one.
    pub fn set_sink(&mut self, sink: Box<dyn GaugeSink>) {
        self.sink = Some(sink);
    }

    /// Last measurement dispatched, if any.
    pub fn last_measurement(&self) -> Option<f64> {
        self.last_measurement
    }

    /// Device info retained from the first successful identification.
    pub fn cached_device_info(&self) -> Option<&str> {
        self.device_info.as_deref()
    }

    /// Send a framed command unless one is already awaiting its response.
    ///
    /// Returns `Ok(false)` for the overlap case: the command is not sent,
    /// and the caller may retry once the pending request completes or
    /// expires.
    pub fn send_command<T: GaugeTransport>(
        &mut self,
        transport: &mut T,
        command: &Command,
    ) -> DriverResult<bool> {
        if !self
            .tracker
            .begin(self.clock.now(), self.config.response_timeout)
        {
            warn!("Command not sent: still waiting for a response");
            return Ok(false);
        }
        if let Err(e) = transport.send_command(command.as_bytes()) {
            self.tracker.complete();
            return Err(e.into());
        }
        debug!("Sent command {:?}", command.as_bytes());
        Ok(true)
    }

    pub fn request_reading<T: GaugeTransport>(&mut self, transport: &mut T) -> DriverResult<bool> {
        self.send_command(transport, &Command::request_reading())
    }

    pub fn request_device_info<T: GaugeTransport>(
        &mut self,
        transport: &mut T,
    ) -> DriverResult<bool> {
        self.send_command(transport, &Command::request_device_info())
    }

    /// Run one poll cycle; returns the number of frames decoded.
    ///
    /// Transport timeouts (empty reads) are the expected idle case. Decode
    /// failures drop the frame but still complete the pending request — the
    /// instrument answered, however garbled. Fatal transport errors
    /// propagate untouched.
    pub fn poll<T: GaugeTransport>(&mut self, transport: &mut T) -> DriverResult<usize> {
        let bytes = transport.read_bytes(self.config.read_timeout)?;
        if !bytes.is_empty() {
            self.accumulator.ingest(&bytes);
        }

        let mut dispatched = 0;
        while let Some(frame) = self.accumulator.try_extract() {
            self.tracker.complete();
            match self.decoder.decode(&frame) {
                Ok(message) => {
                    self.dispatch(message);
                    dispatched += 1;
                }
                Err(e) => error!("Dropping undecodable frame: {}", e),
            }
        }

        if self.tracker.check_timeout(self.clock.now()) {
            warn!(
                "No response within {}ms; request abandoned",
                self.config.response_timeout.as_millis()
            );
        }

        Ok(dispatched)
    }

    /// Request and wait for one fresh measurement.
    ///
    /// Busy-polls with `poll_interval` sleeps until a value arrives or
    /// `response_timeout` elapses. A request deferred behind an earlier
    /// pending command is retried as soon as the tracker goes idle.
    pub fn read_measurement<T: GaugeTransport>(&mut self, transport: &mut T) -> DriverResult<f64> {
        self.last_measurement = None;
        let deadline = self.clock.now() + self.config.response_timeout;
        let mut sent = self.request_reading(transport)?;

        loop {
            self.poll(transport)?;
            if let Some(value) = self.last_measurement {
                return Ok(value);
            }
            if !sent {
                sent = self.request_reading(transport)?;
            }
            if self.clock.now() >= deadline {
                return Err(DriverError::ResponseTimeout {
                    timeout_ms: self.config.response_timeout.as_millis() as u64,
                });
            }
            self.clock.sleep(self.config.poll_interval);
        }
    }

    /// Return the identification string, querying the instrument on first
    /// use. The first successful result is cached for the lifetime of the
    /// driver and later calls never overwrite it.
    pub fn read_device_info<T: GaugeTransport>(
        &mut self,
        transport: &mut T,
    ) -> DriverResult<String> {
        if let Some(info) = &self.device_info {
            return Ok(info.clone());
        }

        let deadline = self.clock.now() + self.config.response_timeout;
        let mut sent = self.request_device_info(transport)?;

        loop {
            self.poll(transport)?;
            if let Some(info) = &self.device_info {
                return Ok(info.clone());
            }
            if !sent {
                sent = self.request_device_info(transport)?;
            }
            if self.clock.now() >= deadline {
                return Err(DriverError::ResponseTimeout {
                    timeout_ms: self.config.response_timeout.as_millis() as u64,
                });
            }
            self.clock.sleep(self.config.poll_interval);
        }
    }

    /// Caches update before the sink runs, so a panicking handler cannot
    /// leave the driver inconsistent.
    fn dispatch(&mut self, message: Message) {
        match message {
            Message::Measurement(value) => {
                self.last_measurement = Some(value);
                if let Some(sink) = self.sink.as_mut() {
                    sink.on_measurement(value);
                }
            }
            Message::DeviceInfo(info) => {
                if self.device_info.is_none() {
                    self.device_info = Some(info.clone());
                }
                if let Some(sink) = self.sink.as_mut() {
                    sink.on_device_info(&info);
                }
            }
            Message::Status(status) => {
                if let Some(sink) = self.sink.as_mut() {
                    sink.on_status(&status);
                }
            }
            Message::Unrecognized(raw) => {
                warn!("Ignoring unrecognized response {:?}", raw);
            }
        }
    }
}

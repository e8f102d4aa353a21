//! `rusb`-backed transport for the Mitutoyo USB-ITN input tool.
//!
//! The instrument is a vendor-class device, not HID: commands travel as
//! vendor control transfers and responses arrive on the sole interrupt IN
//! endpoint of interface 0. Setup reproduces the sequence the instrument
//! expects before it will answer anything: kernel driver detach, reset,
//! configuration 1, interface claim, then a vendor wake-up handshake.

use std::time::Duration;

use rusb::{
    Context, Device, DeviceHandle, Direction, Recipient, RequestType, TransferType, UsbContext,
};
use tracing::debug;

use crate::transport::GaugeTransport;
use crate::{TransportError, TransportResult};

const INTERFACE: u8 = 0;
const CONFIGURATION: u8 = 1;

/// Vendor wake-up request issued once during setup.
const WAKEUP_REQUEST: u8 = 0x01;
const WAKEUP_VALUE: u16 = 0xA5A5;

/// Vendor status read completing the wake-up handshake.
const STATUS_REQUEST: u8 = 0x02;

/// Vendor request carrying a framed command to the instrument.
const COMMAND_REQUEST: u8 = 0x03;

const CONTROL_TIMEOUT: Duration = Duration::from_millis(500);

/// Open handle to one USB-ITN instrument.
pub struct UsbItnTransport {
    handle: DeviceHandle<Context>,
    endpoint: u8,
    max_packet_size: usize,
}

impl UsbItnTransport {
    /// Open and initialize the first instrument matching the given IDs.
    pub fn open(vendor_id: u16, product_id: u16) -> TransportResult<Self> {
        let context = Context::new().map_err(|e| TransportError::OpenFailed(e.to_string()))?;
        let mut handle = context
            .open_device_with_vid_pid(vendor_id, product_id)
            .ok_or(TransportError::DeviceNotFound {
                vendor_id,
                product_id,
            })?;

        // The kernel binds usbhid to the instrument's interface; raw vendor
        // transfers need it out of the way first.
        if handle.kernel_driver_active(INTERFACE).unwrap_or(false) {
            handle
                .detach_kernel_driver(INTERFACE)
                .map_err(|e| TransportError::SetupFailed(format!("kernel driver detach: {e}")))?;
        }

        handle
            .reset()
            .map_err(|e| TransportError::SetupFailed(format!("device reset: {e}")))?;
        handle
            .set_active_configuration(CONFIGURATION)
            .map_err(|e| TransportError::SetupFailed(format!("set configuration: {e}")))?;
        handle
            .claim_interface(INTERFACE)
            .map_err(|e| TransportError::SetupFailed(format!("claim interface: {e}")))?;

        let (endpoint, max_packet_size) = find_interrupt_in_endpoint(&handle.device())?;
        debug!(
            "Claimed USB-ITN interrupt IN endpoint 0x{:02X} (max packet {} bytes)",
            endpoint, max_packet_size
        );

        let mut transport = Self {
            handle,
            endpoint,
            max_packet_size,
        };
        transport.wake_up()?;
        Ok(transport)
    }

    /// Vendor wake-up handshake; the instrument stays mute until it runs.
    fn wake_up(&mut self) -> TransportResult<()> {
        let out = rusb::request_type(Direction::Out, RequestType::Vendor, Recipient::Device);
        self.handle
            .write_control(out, WAKEUP_REQUEST, WAKEUP_VALUE, 0, &[], CONTROL_TIMEOUT)
            .map_err(|e| TransportError::SetupFailed(format!("vendor wake-up: {e}")))?;

        let input = rusb::request_type(Direction::In, RequestType::Vendor, Recipient::Device);
        let mut status = [0u8; 1];
        let n = self
            .handle
            .read_control(input, STATUS_REQUEST, 0, 0, &mut status, CONTROL_TIMEOUT)
            .map_err(|e| TransportError::SetupFailed(format!("vendor status read: {e}")))?;
        debug!("Vendor wake-up response: {:?}", &status[..n]);
        Ok(())
    }
}

impl GaugeTransport for UsbItnTransport {
    fn send_command(&mut self, data: &[u8]) -> TransportResult<()> {
        let out = rusb::request_type(Direction::Out, RequestType::Vendor, Recipient::Device);
        self.handle
            .write_control(out, COMMAND_REQUEST, 0, 0, data, CONTROL_TIMEOUT)
            .map_err(|e| match e {
                rusb::Error::NoDevice => TransportError::Disconnected,
                other => TransportError::WriteFailed(other.to_string()),
            })?;
        Ok(())
    }

    fn read_bytes(&mut self, timeout: Duration) -> TransportResult<Vec<u8>> {
        let mut buf = vec![0u8; self.max_packet_size];
        match self.handle.read_interrupt(self.endpoint, &mut buf, timeout) {
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(rusb::Error::Timeout) => Ok(Vec::new()),
            Err(rusb::Error::NoDevice) | Err(rusb::Error::Pipe) => {
                Err(TransportError::Disconnected)
            }
            Err(e) => Err(TransportError::ReadFailed(e.to_string())),
        }
    }
}

fn find_interrupt_in_endpoint(device: &Device<Context>) -> TransportResult<(u8, usize)> {
    let config = device
        .active_config_descriptor()
        .map_err(|e| TransportError::SetupFailed(format!("config descriptor: {e}")))?;

    for interface in config.interfaces() {
        for descriptor in interface.descriptors() {
            for endpoint in descriptor.endpoint_descriptors() {
                if endpoint.direction() == Direction::In
                    && endpoint.transfer_type() == TransferType::Interrupt
                {
                    return Ok((endpoint.address(), endpoint.max_packet_size() as usize));
                }
            }
        }
    }
    Err(TransportError::EndpointNotFound)
}

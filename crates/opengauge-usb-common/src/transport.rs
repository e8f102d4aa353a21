//! Transport capability for gauge drivers.

use std::time::Duration;

use crate::TransportResult;

/// Byte-oriented access to one instrument: a control channel for command
/// transmission plus a bounded read of the interrupt IN endpoint.
///
/// An empty read result means the hardware timeout elapsed with nothing
/// pending. That is the expected idle case and deliberately not an error;
/// [`TransportError::Disconnected`](crate::TransportError::Disconnected) and
/// the other variants are reserved for real failures.
pub trait GaugeTransport {
    /// Send a framed command over the control channel.
    fn send_command(&mut self, data: &[u8]) -> TransportResult<()>;

    /// Read zero or more raw bytes from the interrupt endpoint, waiting at
    /// most `timeout`.
    fn read_bytes(&mut self, timeout: Duration) -> TransportResult<Vec<u8>>;
}

pub mod mock {
    use super::*;
    use crate::TransportError;
    use std::collections::VecDeque;

    /// In-memory transport for driver tests: records sent commands and
    /// serves queued read chunks in order, one chunk per read.
    #[derive(Debug)]
    pub struct MockTransport {
        reads: VecDeque<Vec<u8>>,
        sent: Vec<Vec<u8>>,
        connected: bool,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                reads: VecDeque::new(),
                sent: Vec::new(),
                connected: true,
            }
        }

        /// Queue one chunk for a future `read_bytes` call.
        pub fn queue_read(&mut self, chunk: impl Into<Vec<u8>>) {
            self.reads.push_back(chunk.into());
        }

        /// Every command sent so far, in order.
        pub fn sent_commands(&self) -> &[Vec<u8>] {
            &self.sent
        }

        pub fn disconnect(&mut self) {
            self.connected = false;
        }
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl GaugeTransport for MockTransport {
        fn send_command(&mut self, data: &[u8]) -> TransportResult<()> {
            if !self.connected {
                return Err(TransportError::Disconnected);
            }
            self.sent.push(data.to_vec());
            Ok(())
        }

        fn read_bytes(&mut self, _timeout: Duration) -> TransportResult<Vec<u8>> {
            if !self.connected {
                return Err(TransportError::Disconnected);
            }
            Ok(self.reads.pop_front().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportError;

    #[test]
    fn test_mock_records_sent_commands() {
        let mut transport = mock::MockTransport::new();
        transport
            .send_command(b"1\r")
            .expect("send should succeed");
        transport
            .send_command(b"V\r")
            .expect("send should succeed");
        assert_eq!(
            transport.sent_commands(),
            &[b"1\r".to_vec(), b"V\r".to_vec()]
        );
    }

    #[test]
    fn test_mock_serves_queued_chunks_in_order() {
        let mut transport = mock::MockTransport::new();
        transport.queue_read(b"01A".to_vec());
        transport.queue_read(b"+2.0\r".to_vec());

        let timeout = Duration::from_millis(10);
        assert_eq!(
            transport.read_bytes(timeout).expect("read should succeed"),
            b"01A".to_vec()
        );
        assert_eq!(
            transport.read_bytes(timeout).expect("read should succeed"),
            b"+2.0\r".to_vec()
        );
    }

    #[test]
    fn test_mock_empty_read_when_no_data() {
        let mut transport = mock::MockTransport::new();
        let chunk = transport
            .read_bytes(Duration::from_millis(10))
            .expect("read should succeed");
        assert!(chunk.is_empty());
    }

    #[test]
    fn test_mock_disconnect() {
        let mut transport = mock::MockTransport::new();
        transport.disconnect();
        assert!(matches!(
            transport.send_command(b"1\r"),
            Err(TransportError::Disconnected)
        ));
        assert!(matches!(
            transport.read_bytes(Duration::from_millis(10)),
            Err(TransportError::Disconnected)
        ));
    }
}

//! In-memory transport for tests
//!
//! Models the half-duplex K-Line: everything written is echoed back ahead of
//! any tester bytes still queued.

use std::collections::VecDeque;

use super::Transport;
use crate::error::TransportError;

#[derive(Debug, Default)]
pub struct MockTransport {
    input: VecDeque<u8>,
    echo: VecDeque<u8>,
    echo_enabled: bool,
    fail_writes: bool,
    fail_reads: bool,
    /// Every frame passed to `write`, in order
    pub written: Vec<Vec<u8>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            echo_enabled: true,
            ..Self::default()
        }
    }

    /// Transport with tester bytes queued for reading
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.queue_input(bytes);
        transport
    }

    pub fn queue_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Stop reflecting writes, as if the echo never arrived
    pub fn disable_echo(&mut self) {
        self.echo_enabled = false;
    }

    /// Make every write fail
    pub fn fail_writes(&mut self) {
        self.fail_writes = true;
    }

    /// Make every read fail until switched back
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        if self.fail_reads {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "mock read failure",
            )));
        }

        let mut read = 0;
        for slot in buffer.iter_mut() {
            match self.echo.pop_front().or_else(|| self.input.pop_front()) {
                Some(byte) => {
                    *slot = byte;
                    read += 1;
                }
                None => break,
            }
        }
        Ok(read)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if self.fail_writes {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock write failure",
            )));
        }

        self.written.push(data.to_vec());
        if self.echo_enabled {
            self.echo.extend(data);
        }
        Ok(data.len())
    }
}

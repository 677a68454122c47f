//! Command handler
//!
//! Impersonates the ECU end of the K-Line. Tester bytes are accumulated one
//! at a time; after each byte the head of the input is matched against the
//! handshake table and then against every sensor read in the catalog.
//!
//! The line is half-duplex, so every reply we transmit is read straight back
//! as an echo before the next tester byte is looked at.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::buffer::InputBuffer;
use crate::hex::HexBytes;
use crate::overrides::ResponseOverrides;
use crate::protocol::{self, HANDSHAKE_FRAMES, SENSOR_CATALOG};
use crate::transport::Transport;

/// Pause after a failed read so a dead link does not spin the loop
pub const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Counters for the lifetime of the handler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub bytes_received: u64,
    pub handshake_replies: u64,
    pub sensor_replies: u64,
    pub echo_failures: u64,
    pub read_failures: u64,
}

/// ECU side of the diagnostic link
pub struct CommandHandler<T: Transport> {
    transport: T,
    overrides: ResponseOverrides,
    input: InputBuffer,
    stats: SessionStats,
    read_failing: bool,
}

impl<T: Transport> CommandHandler<T> {
    /// Create a handler with an empty input buffer
    pub fn new(transport: T, overrides: ResponseOverrides) -> Self {
        Self::with_input(transport, overrides, InputBuffer::new())
    }

    /// Create a handler that continues from an existing input buffer
    pub fn with_input(transport: T, overrides: ResponseOverrides, input: InputBuffer) -> Self {
        Self {
            transport,
            overrides,
            input,
            stats: SessionStats::default(),
            read_failing: false,
        }
    }

    /// Serve the link forever
    pub fn run(&mut self) -> ! {
        info!("Waiting for diagnostic tool...");
        loop {
            self.poll();
        }
    }

    /// Wait (up to the read timeout) for one byte and handle it.
    ///
    /// Returns the number of replies sent. A timeout or read error means
    /// nothing happened this cycle. Only the first of a run of read errors
    /// is logged as a warning.
    pub fn poll(&mut self) -> usize {
        match self.transport.read_byte() {
            Ok(byte) => {
                if self.read_failing {
                    info!("Link readable again");
                    self.read_failing = false;
                }
                byte.map_or(0, |byte| self.handle_byte(byte))
            }
            Err(e) => {
                self.stats.read_failures += 1;
                if self.read_failing {
                    debug!("Read failed: {}", e);
                } else {
                    warn!("Read failed: {}", e);
                    self.read_failing = true;
                }
                thread::sleep(READ_ERROR_BACKOFF);
                0
            }
        }
    }

    /// Append a received byte and run the matchers
    pub fn handle_byte(&mut self, byte: u8) -> usize {
        self.input.push(byte);
        self.stats.bytes_received += 1;
        debug!("Current input command: {}", self.input);

        self.dispatch()
    }

    /// Match the current input against both tables and reply.
    ///
    /// Handshake frames are tried first and stop at the first match. Sensor
    /// reads are then tried in catalog order without stopping, so several
    /// queued requests can be answered in one cycle.
    pub fn dispatch(&mut self) -> usize {
        let mut replies = usize::from(self.handle_static_commands());

        if !self.input.is_empty() {
            replies += self.handle_dynamic_commands();
        }

        replies
    }

    fn handle_static_commands(&mut self) -> bool {
        let Some(frame) = HANDSHAKE_FRAMES
            .iter()
            .find(|frame| self.input.try_consume(frame.command))
        else {
            return false;
        };

        info!(
            "Found match for {} command {} responding with {}",
            frame.name,
            HexBytes(frame.command),
            HexBytes(frame.response)
        );

        self.transmit(frame.response);
        self.stats.handshake_replies += 1;
        true
    }

    fn handle_dynamic_commands(&mut self) -> usize {
        let mut replies = 0;

        for descriptor in &SENSOR_CATALOG {
            let request = protocol::sensor_request(descriptor.sensor_id);
            if !self.input.try_consume(&request) {
                continue;
            }

            let value = self.overrides.get(descriptor.sensor_id);
            let response = protocol::sensor_response(descriptor, value);

            info!(
                "Found match for {} read {} responding with {}",
                descriptor.name,
                HexBytes(&request),
                HexBytes(&response)
            );

            self.transmit(&response);
            self.stats.sensor_replies += 1;
            replies += 1;
        }

        replies
    }

    /// Write a reply and drain its echo
    fn transmit(&mut self, response: &[u8]) {
        match self.transport.write(response) {
            Ok(written) if written == response.len() => {}
            Ok(written) => warn!("Short write: {} of {} bytes", written, response.len()),
            Err(e) => warn!("Write failed: {}", e),
        }

        match self.transport.read_exact(response.len()) {
            Ok(echo) => {
                debug!("Received echoed response {}", HexBytes(&echo));
                if echo != response {
                    warn!(
                        "Echo mismatch: sent {}, read back {}",
                        HexBytes(response),
                        HexBytes(&echo)
                    );
                    self.stats.echo_failures += 1;
                }
            }
            Err(e) => {
                warn!("Echo not received: {}", e);
                self.stats.echo_failures += 1;
            }
        }
    }

    /// Bytes received but not yet matched
    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn overrides(&self) -> &ResponseOverrides {
        &self.overrides
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

//! FTDI D2XX backend
//!
//! Drives the cable through the D2XX driver instead of VCP. By default device 0
//! is opened at 10400 baud.

use std::thread;
use std::time::{Duration, Instant};

use libftd2xx::{list_devices as ftdi_list, BitsPerWord, Ftdi, FtdiCommon, Parity, StopBits};
use tracing::{debug, info, warn};

use super::Transport;
use crate::config::TransportSettings;
use crate::error::TransportError;
use crate::hex::HexBytes;

/// FTDI device information
#[derive(Debug, Clone)]
pub struct FtdiDevice {
    pub index: usize,
    pub description: String,
    pub serial_number: String,
}

/// List all available FTDI devices
pub fn list_devices() -> Result<Vec<FtdiDevice>, TransportError> {
    let devices = ftdi_list()?;

    Ok(devices
        .into_iter()
        .enumerate()
        .map(|(i, info)| FtdiDevice {
            index: i,
            description: info.description,
            serial_number: info.serial_number,
        })
        .collect())
}

/// FTDI device configured for K-Line
pub struct FtdiTransport {
    device: Ftdi,
    read_timeout: Duration,
}

impl FtdiTransport {
    /// Open FTDI device by index and configure it (8N1, no flow control)
    pub fn open(settings: &TransportSettings) -> Result<Self, TransportError> {
        info!("Opening FTDI device index {}...", settings.device_index);

        let mut device = Ftdi::with_index(settings.device_index)?;

        device.reset()?;
        device.set_data_characteristics(BitsPerWord::Bits8, StopBits::Bits1, Parity::No)?;
        device.set_baud_rate(settings.baud_rate)?;
        device.set_timeouts(
            Duration::from_millis(settings.read_timeout_ms),
            Duration::from_millis(settings.write_timeout_ms),
        )?;
        device.set_flow_control_none()?;

        // Minimum latency so single bytes are delivered promptly
        device.set_latency_timer(Duration::from_millis(1))?;

        device.purge_all()?;

        info!(
            "FTDI device opened successfully ({} baud, 8N1)",
            settings.baud_rate
        );

        Ok(Self {
            device,
            read_timeout: Duration::from_millis(settings.read_timeout_ms),
        })
    }
}

impl Transport for FtdiTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        let start = Instant::now();
        let mut total_read = 0;

        while start.elapsed() < self.read_timeout && total_read < buffer.len() {
            let queue_status = self.device.queue_status()?;

            if queue_status > 0 {
                let to_read = queue_status.min(buffer.len() - total_read);
                let read = self
                    .device
                    .read(&mut buffer[total_read..total_read + to_read])?;
                total_read += read;
            } else {
                thread::sleep(Duration::from_micros(100));
            }
        }

        if total_read > 0 {
            debug!("RX: {}", HexBytes(&buffer[..total_read]));
        }

        Ok(total_read)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        debug!("TX: {}", HexBytes(data));
        Ok(self.device.write(data)?)
    }
}

impl Drop for FtdiTransport {
    fn drop(&mut self) {
        if let Err(e) = self.device.close() {
            warn!("Failed to close FTDI device: {}", e);
        }
    }
}

//! Operating system serial port backend
//!
//! Works with an FTDI cable in VCP mode or with a virtual tty, for example
//! one end of a `socat -d -d pty,raw,echo=0 pty,raw,echo=0` pair.

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use serialport::{available_ports, SerialPort, SerialPortType};
use tracing::{debug, info};

use super::Transport;
use crate::config::TransportSettings;
use crate::error::TransportError;
use crate::hex::HexBytes;

/// FTDI USB vendor id
const FTDI_VID: u16 = 0x0403;

/// Information about a serial port
#[derive(Debug, Clone)]
pub struct PortInfo {
    pub name: String,
    pub port_type: String,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub product: Option<String>,
    pub is_ftdi: bool,
}

/// List all available serial ports
pub fn list_ports() -> Result<Vec<PortInfo>, TransportError> {
    let ports = available_ports()?;

    Ok(ports
        .into_iter()
        .map(|p| {
            let (port_type, vid, pid, product) = match &p.port_type {
                SerialPortType::UsbPort(usb) => {
                    ("USB", Some(usb.vid), Some(usb.pid), usb.product.clone())
                }
                SerialPortType::PciPort => ("PCI", None, None, None),
                SerialPortType::BluetoothPort => ("Bluetooth", None, None, None),
                SerialPortType::Unknown => ("Unknown", None, None, None),
            };

            PortInfo {
                name: p.port_name,
                port_type: port_type.to_string(),
                vid,
                pid,
                product,
                is_ftdi: vid == Some(FTDI_VID),
            }
        })
        .collect())
}

/// Serial port configured for K-Line (8N1, no flow control)
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl SerialTransport {
    /// Open and configure the port named in `settings`
    pub fn open(settings: &TransportSettings) -> Result<Self, TransportError> {
        info!(
            "Opening serial port {} ({} baud, 8N1)",
            settings.port, settings.baud_rate
        );

        let read_timeout = Duration::from_millis(settings.read_timeout_ms);
        let write_timeout = Duration::from_millis(settings.write_timeout_ms);

        let port = serialport::new(settings.port.as_str(), settings.baud_rate)
            .timeout(read_timeout)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .open()?;

        port.clear(serialport::ClearBuffer::All)?;

        info!("Serial port opened successfully");

        Ok(Self {
            port,
            read_timeout,
            write_timeout,
        })
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        let start = Instant::now();
        let mut total_read = 0;

        self.port.set_timeout(self.read_timeout)?;

        while total_read < buffer.len() && start.elapsed() < self.read_timeout {
            match self.port.read(&mut buffer[total_read..]) {
                Ok(read) => total_read += read,
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if total_read > 0 {
            debug!("RX: {}", HexBytes(&buffer[..total_read]));
        }

        Ok(total_read)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        debug!("TX: {}", HexBytes(data));

        self.port.set_timeout(self.write_timeout)?;
        self.port.write_all(data)?;
        self.port.flush()?;

        Ok(data.len())
    }
}

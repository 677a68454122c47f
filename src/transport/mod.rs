//! Serial transport
//!
//! The dispatch loop only needs blocking reads bounded by a timeout and
//! blocking writes. Two backends provide them: FTDI D2XX direct control
//! (feature `ftdi`) and a plain operating system serial port.

#[cfg(feature = "ftdi")]
pub mod ftdi;
#[cfg(test)]
pub mod mock;
pub mod serial;

use tracing::info;

use crate::config::{Backend, TransportSettings};
use crate::error::TransportError;

pub use serial::{list_ports, PortInfo, SerialTransport};

/// Byte-level access to the K-Line
pub trait Transport {
    /// Read into `buffer`, returning once it is full or the read timeout
    /// expires. Returns the number of bytes read; 0 means timeout.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError>;

    /// Write `data`, returning the number of bytes the device accepted
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Read a single byte. `None` on timeout.
    fn read_byte(&mut self) -> Result<Option<u8>, TransportError> {
        let mut byte = [0u8; 1];
        let read = self.read(&mut byte)?;
        Ok((read == 1).then_some(byte[0]))
    }

    /// Read exactly `length` bytes or fail with a timeout
    fn read_exact(&mut self, length: usize) -> Result<Vec<u8>, TransportError> {
        let mut buffer = vec![0u8; length];
        let read = self.read(&mut buffer)?;

        if read < length {
            return Err(TransportError::Timeout {
                expected: length,
                received: read,
            });
        }

        Ok(buffer)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read(buffer)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        (**self).write(data)
    }
}

/// Open and configure the link selected in `settings`
pub fn connect(settings: &TransportSettings) -> Result<Box<dyn Transport>, TransportError> {
    info!("Connecting via {} backend", settings.backend);

    match settings.backend {
        #[cfg(feature = "ftdi")]
        Backend::Ftdi => Ok(Box::new(ftdi::FtdiTransport::open(settings)?)),
        #[cfg(not(feature = "ftdi"))]
        Backend::Ftdi => Err(TransportError::BackendUnavailable("ftdi")),
        Backend::Serial => Ok(Box::new(SerialTransport::open(settings)?)),
    }
}

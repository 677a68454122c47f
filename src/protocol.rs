//! MEMS 2J Protocol Framing
//!
//! Checksums, the fixed initialisation handshake, the ReadDataByLocalId
//! sensor catalog and the builders for every frame the simulator sends.
//!
//! Frame format on the wire:
//!
//! ```text
//! [length-or-fixed prefix] [payload...] [checksum]
//! ```
//!
//! The checksum is the 8-bit wrapping sum of every preceding byte.

/// KWP2000 service IDs seen on the MEMS 2J link
pub mod services {
    pub const START_DIAGNOSTIC_SESSION: u8 = 0x10;
    pub const READ_DATA_BY_LOCAL_ID: u8 = 0x21;
    pub const SECURITY_ACCESS: u8 = 0x27;
    pub const TESTER_PRESENT: u8 = 0x3E;
    pub const START_COMMUNICATION: u8 = 0x81;

    /// Positive response = request service + 0x40
    pub const POSITIVE_RESPONSE_OFFSET: u8 = 0x40;

    /// Positive response to ReadDataByLocalId
    pub const READ_DATA_BY_LOCAL_ID_RESPONSE: u8 = positive_response(READ_DATA_BY_LOCAL_ID);

    pub const fn positive_response(service: u8) -> u8 {
        service + POSITIVE_RESPONSE_OFFSET
    }
}

use services::positive_response;

/// Length byte that prefixes every sensor read request
const SENSOR_REQUEST_LENGTH: u8 = 0x02;

/// Calculate checksum (sum of all bytes mod 256)
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// A fixed command/response exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticFrame {
    pub name: &'static str,
    pub command: &'static [u8],
    pub response: &'static [u8],
}

/// Initialisation handshake followed by the heartbeat exchange.
///
/// Iteration order is match order: the first entry whose command sits at the
/// head of the input wins.
pub static HANDSHAKE_FRAMES: [StaticFrame; 5] = [
    StaticFrame {
        name: "start communication",
        command: &[0x00, 0x81, 0x13, 0xF7, services::START_COMMUNICATION, 0x0C],
        response: &[
            0x03,
            positive_response(services::START_COMMUNICATION),
            0xD5,
            0x8F,
            0x28,
        ],
    },
    StaticFrame {
        name: "start diagnostic session",
        command: &[0x02, services::START_DIAGNOSTIC_SESSION, 0xA0, 0xB2],
        response: &[0x01, positive_response(services::START_DIAGNOSTIC_SESSION), 0x51],
    },
    StaticFrame {
        name: "security access seed request",
        command: &[0x02, services::SECURITY_ACCESS, 0x01, 0x2A],
        response: &[
            0x04,
            positive_response(services::SECURITY_ACCESS),
            0x01,
            0x96,
            0xA4,
            0xA6,
        ],
    },
    StaticFrame {
        name: "security access key",
        command: &[0x04, services::SECURITY_ACCESS, 0x02, 0xD9, 0x34, 0x3A],
        response: &[0x02, positive_response(services::SECURITY_ACCESS), 0x02, 0x6B],
    },
    StaticFrame {
        name: "tester present",
        command: &[0x02, services::TESTER_PRESENT, 0x01, 0x41],
        response: &[0x01, positive_response(services::TESTER_PRESENT), 0x7F],
    },
];

/// A sensor channel readable with ReadDataByLocalId
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescriptor {
    pub sensor_id: u8,
    pub payload_length: u8,
    pub name: &'static str,
}

impl SensorDescriptor {
    /// Only two-byte channels can carry a simulated value
    pub fn accepts_override(&self) -> bool {
        self.payload_length == 2
    }
}

const fn sensor(sensor_id: u8, payload_length: u8, name: &'static str) -> SensorDescriptor {
    SensorDescriptor {
        sensor_id,
        payload_length,
        name,
    }
}

/// Supported sensor reads, in scan order
pub static SENSOR_CATALOG: [SensorDescriptor; 14] = [
    sensor(0x05, 2, "coolant temperature"),
    sensor(0x06, 2, "intake air temperature"),
    sensor(0x07, 2, "ambient air temperature"),
    sensor(0x08, 2, "engine speed"),
    sensor(0x09, 2, "battery voltage"),
    sensor(0x0A, 2, "throttle position"),
    sensor(0x0B, 2, "manifold absolute pressure"),
    sensor(0x0C, 2, "idle air control position"),
    sensor(0x0D, 2, "road speed"),
    sensor(0x0F, 2, "lambda sensor voltage"),
    sensor(0x10, 2, "ignition advance"),
    sensor(0x12, 2, "injector pulse width"),
    sensor(0x19, 4, "fuel trim block"),
    sensor(0x25, 8, "stored fault block"),
];

/// Look up a sensor in the catalog
pub fn find_sensor(sensor_id: u8) -> Option<&'static SensorDescriptor> {
    SENSOR_CATALOG.iter().find(|s| s.sensor_id == sensor_id)
}

/// Build the request a tester sends to read a sensor
///
/// Format: 02 21 ID CHK
pub fn sensor_request(sensor_id: u8) -> Vec<u8> {
    let mut bytes = vec![
        SENSOR_REQUEST_LENGTH,
        services::READ_DATA_BY_LOCAL_ID,
        sensor_id,
    ];
    bytes.push(checksum(&bytes));
    bytes
}

/// Split a simulated value into the two payload bytes.
///
/// NOTE: the high byte is `value >> 1`, not `value >> 8`. This matches the
/// existing simulator bit-for-bit and must stay that way until the intended
/// encoding is confirmed.
pub fn split_override(value: u16) -> [u8; 2] {
    [(value >> 1) as u8, (value & 0xFF) as u8]
}

/// Build the ECU reply to a sensor read
///
/// Format: LEN 61 ID PAYLOAD... CHK
///
/// LEN counts the sensor id echo plus the payload. Without an override the
/// payload is `payload_length` zero bytes.
pub fn sensor_response(descriptor: &SensorDescriptor, value: Option<u16>) -> Vec<u8> {
    let payload_length = usize::from(descriptor.payload_length);
    let mut bytes = Vec::with_capacity(payload_length + 4);

    bytes.push(descriptor.payload_length + 1);
    bytes.push(services::READ_DATA_BY_LOCAL_ID_RESPONSE);
    bytes.push(descriptor.sensor_id);

    match value {
        Some(value) => bytes.extend_from_slice(&split_override(value)),
        None => bytes.resize(bytes.len() + payload_length, 0x00),
    }

    bytes.push(checksum(&bytes));
    bytes
}

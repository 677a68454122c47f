//! Response override table
//!
//! Simulated values used in place of the all-zero sensor payload. The table
//! is validated once at startup and is read-only afterwards.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::protocol::find_sensor;

/// Sensor id -> simulated 16-bit value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseOverrides {
    values: BTreeMap<u8, u16>,
}

impl ResponseOverrides {
    /// Empty table: every sensor answers with zeros
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table, rejecting duplicates and sensors that cannot carry
    /// a two-byte value.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (u8, u16)>,
    {
        let mut values = BTreeMap::new();

        for (sensor_id, value) in pairs {
            let descriptor = find_sensor(sensor_id).ok_or(ConfigError::UnknownSensor(sensor_id))?;

            if !descriptor.accepts_override() {
                return Err(ConfigError::UnsupportedPayloadLength {
                    sensor_id,
                    payload_length: descriptor.payload_length,
                });
            }

            if values.insert(sensor_id, value).is_some() {
                return Err(ConfigError::DuplicateSensor(sensor_id));
            }
        }

        Ok(Self { values })
    }

    /// Simulated value for a sensor, if one was configured
    pub fn get(&self, sensor_id: u8) -> Option<u16> {
        self.values.get(&sensor_id).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries ordered by sensor id
    pub fn iter(&self) -> impl Iterator<Item = (u8, u16)> + '_ {
        self.values.iter().map(|(&id, &value)| (id, value))
    }
}

/// Parse positional `SENSOR VALUE` hex token pairs from the command line.
///
/// Tokens accept an optional `0x` prefix. Sensor ids must fit a byte and
/// values 16 bits.
pub fn parse_override_args<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<(u8, u16)>, ConfigError> {
    if tokens.len() % 2 != 0 {
        return Err(ConfigError::OddArgumentCount(tokens.len()));
    }

    tokens
        .chunks_exact(2)
        .map(|pair| {
            let sensor_id = parse_hex_u8(pair[0].as_ref())?;
            let value = parse_hex_u16(pair[1].as_ref())?;
            Ok((sensor_id, value))
        })
        .collect()
}

fn strip_hex_prefix(token: &str) -> &str {
    let token = token.trim();
    token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token)
}

fn parse_hex_u8(token: &str) -> Result<u8, ConfigError> {
    u8::from_str_radix(strip_hex_prefix(token), 16).map_err(|_| ConfigError::InvalidHex {
        field: "sensor id",
        token: token.to_string(),
    })
}

fn parse_hex_u16(token: &str) -> Result<u16, ConfigError> {
    u16::from_str_radix(strip_hex_prefix(token), 16).map_err(|_| ConfigError::InvalidHex {
        field: "value",
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_override_args(&["08", "1234", "0x0A", "0XFF"]).unwrap();
        assert_eq!(pairs, vec![(0x08, 0x1234), (0x0A, 0x00FF)]);
    }

    #[test]
    fn test_parse_empty() {
        let tokens: [&str; 0] = [];
        assert!(parse_override_args(&tokens).unwrap().is_empty());
    }

    #[test]
    fn test_parse_odd_count() {
        let err = parse_override_args(&["08", "1234", "09"]).unwrap_err();
        assert!(matches!(err, ConfigError::OddArgumentCount(3)));
    }

    #[test]
    fn test_parse_invalid_hex() {
        let err = parse_override_args(&["zz", "1234"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHex { field: "sensor id", .. }));

        let err = parse_override_args(&["08", "12G4"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHex { field: "value", .. }));
    }

    #[test]
    fn test_parse_out_of_range() {
        assert!(parse_override_args(&["108", "1234"]).is_err());
        assert!(parse_override_args(&["08", "10000"]).is_err());
    }

    #[test]
    fn test_table_lookup() {
        let table = ResponseOverrides::from_pairs([(0x08, 0x1234), (0x05, 0x0050)]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0x08), Some(0x1234));
        assert_eq!(table.get(0x06), None);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(0x05, 0x0050), (0x08, 0x1234)]);
    }

    #[test]
    fn test_table_rejects_unknown_sensor() {
        let err = ResponseOverrides::from_pairs([(0x01, 0x0001)]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSensor(0x01)));
    }

    #[test]
    fn test_table_rejects_wide_sensor() {
        let err = ResponseOverrides::from_pairs([(0x19, 0x0001)]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedPayloadLength {
                sensor_id: 0x19,
                payload_length: 4
            }
        ));
    }

    #[test]
    fn test_table_rejects_duplicates() {
        let err = ResponseOverrides::from_pairs([(0x08, 0x0001), (0x08, 0x0002)]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSensor(0x08)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::DuplicateSensor(0x0A).to_string(),
            "Sensor 0x0A already has a response defined"
        );
    }
}

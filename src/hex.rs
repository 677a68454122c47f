//! Hex formatting for log output

use std::fmt;

/// Displays bytes as `0x02 0x10 0xA0 0xB2`
#[derive(Debug, Clone, Copy)]
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "0x{:02X}", byte)?;
        }
        Ok(())
    }
}

/// Format bytes as space separated upper-case hex
pub fn to_hex(bytes: &[u8]) -> String {
    HexBytes(bytes).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x02, 0x10, 0xA0, 0xB2]), "0x02 0x10 0xA0 0xB2");
        assert_eq!(to_hex(&[0x0c]), "0x0C");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn test_display_in_format_args() {
        let line = format!("TX: {}", HexBytes(&[0x01, 0x7E, 0x7F]));
        assert_eq!(line, "TX: 0x01 0x7E 0x7F");
    }
}

//! Input accumulator
//!
//! Bytes arrive one at a time at the tail and leave only as a whole matched
//! frame from the head. A partial or failed match never touches the buffer.

use std::fmt;

use crate::hex::HexBytes;

/// Received bytes not yet consumed by a match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    bytes: Vec<u8>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one received byte
    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Consume `expected` if it sits at the head of the buffer.
    ///
    /// Returns false without mutating when the buffer is shorter than
    /// `expected` or any position differs. Only position 0 is considered;
    /// a matching sequence further in is never found.
    pub fn try_consume(&mut self, expected: &[u8]) -> bool {
        if !self.bytes.starts_with(expected) {
            return false;
        }

        self.bytes.drain(..expected.len());
        true
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for InputBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl fmt::Display for InputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        HexBytes(&self.bytes).fmt(f)
    }
}

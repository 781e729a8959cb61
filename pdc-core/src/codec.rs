//! Register Codec
//!
//! Maps semantic configuration values (a ±8 g range, a 12.5 Hz output rate)
//! to the bit codes a device expects, and decodes little-endian register
//! bursts into integers.
//!
//! ## Lookup tables, not arithmetic
//!
//! Datasheet mappings are not algebraic: the accelerometer puts ±32 g
//! between ±4 g and ±8 g, the gyroscope squeezes 125 dps in at code 1. Each
//! mapping is a static [`CodeTable`] of `(value, code)` pairs searched in
//! both directions. Values are matched exactly, so a fractional rate such as
//! 12.5 Hz must be requested as exactly `12.5`.
//!
//! ## Raw decoding
//!
//! ```text
//! raw = Σ byte[i] << (8·i)            byte 0 is least significant
//! signed: sign-extend from bit (width - 1)
//! ```

use heapless::Vec;

use crate::bus::MAX_BURST_LEN;
use crate::errors::{BusError, SensorError, SensorResult};

/// Static bidirectional mapping between configuration values and bit codes
#[derive(Debug, Clone, Copy)]
pub struct CodeTable<V: 'static> {
    reject_reason: &'static str,
    entries: &'static [(V, u8)],
}

impl<V: Copy + PartialEq + 'static> CodeTable<V> {
    /// Build a table; `reject_reason` is reported for unsupported values
    pub const fn new(reject_reason: &'static str, entries: &'static [(V, u8)]) -> Self {
        Self { reject_reason, entries }
    }

    /// Bit code for `value`, or a configuration error if it is not listed
    pub fn encode(&self, value: V) -> SensorResult<u8> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == value)
            .map(|&(_, code)| code)
            .ok_or(SensorError::Configuration { reason: self.reject_reason })
    }

    /// Configuration value for a bit code read back from a device
    pub fn decode(&self, code: u8) -> SensorResult<V> {
        self.entries
            .iter()
            .find(|&&(_, candidate)| candidate == code)
            .map(|&(value, _)| value)
            .ok_or(SensorError::Configuration { reason: self.reject_reason })
    }

    /// Every supported value, in table order
    pub fn values(&self) -> impl Iterator<Item = V> + '_ {
        self.entries.iter().map(|&(value, _)| value)
    }

    /// Number of supported values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table lists nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Concatenate little-endian bytes and optionally sign-extend from `width` bits
///
/// Bytes beyond the eighth are ignored; bits above `width` are masked off
/// before sign extension.
pub fn decode_raw(bytes: &[u8], signed: bool, width: u32) -> i64 {
    let raw = bytes
        .iter()
        .take(8)
        .enumerate()
        .fold(0u64, |acc, (i, &byte)| acc | (u64::from(byte) << (8 * i)));

    let width = width.clamp(1, 64);
    if width == 64 {
        return raw as i64;
    }

    let masked = raw & ((1u64 << width) - 1);
    if signed {
        let shift = 64 - width;
        ((masked << shift) as i64) >> shift
    } else {
        masked as i64
    }
}

/// Bytes read from one register burst, tagged with the starting address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSample {
    /// Register the burst started at
    pub address: u8,
    /// Burst contents, least significant byte first
    pub bytes: Vec<u8, MAX_BURST_LEN>,
}

impl RawSample {
    /// Copy a burst into a new sample
    pub fn from_slice(address: u8, bytes: &[u8]) -> Result<Self, BusError> {
        let bytes = Vec::from_slice(bytes).map_err(|_| BusError::BufferTooLong {
            requested: bytes.len(),
            limit: MAX_BURST_LEN,
        })?;
        Ok(Self { address, bytes })
    }

    /// Decode the whole burst as one little-endian integer
    pub fn decode(&self, signed: bool) -> i64 {
        decode_raw(&self.bytes, signed, self.bit_width())
    }

    /// Decode `len` bytes starting `offset` bytes into the burst
    ///
    /// Returns `None` when the field runs past the end of the burst.
    pub fn field(&self, offset: usize, len: usize, signed: bool) -> Option<i64> {
        let bytes = self.bytes.get(offset..offset.checked_add(len)?)?;
        Some(decode_raw(bytes, signed, (len * 8) as u32))
    }

    /// Width of the burst in bits
    pub fn bit_width(&self) -> u32 {
        (self.bytes.len() * 8) as u32
    }
}

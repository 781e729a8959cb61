//! Register Transport Contract
//!
//! The recorder talks to every sensor through byte-level register reads and
//! writes on one shared bus. The transport itself (SPI peripheral, chip
//! selects, clocking) belongs to the board support package; this module only
//! fixes the contract the conversion code relies on.
//!
//! ## Explicit device selection
//!
//! Every call names its target with a [`DeviceId`]. Sensor wrappers keep
//! their own id and pass the bus in per call, so no two wrappers share
//! hidden selection state and configuration writes need `&mut` access to
//! both the wrapper and the bus.
//!
//! ## Failure channel
//!
//! Every operation returns `Result<_, BusError>`. Implementations are
//! expected to bound each transaction in time and report
//! [`BusError::Timeout`] rather than stalling the flight computer.
//!
//! ## Dummy bytes
//!
//! Some devices clock out one throwaway byte before valid data on a read
//! burst. [`RegisterBus::read_register_with_dummy`] reads one extra byte and
//! drops it.

use crate::codec::RawSample;
use crate::constants::time::{
    DEFAULT_LIVENESS_ATTEMPTS, DEFAULT_LIVENESS_BACKOFF_FACTOR, DEFAULT_LIVENESS_BACKOFF_MS,
};
use crate::errors::{BusError, SensorError, SensorResult};
use crate::time::Delay;

/// Longest register burst supported by the contract
pub const MAX_BURST_LEN: usize = 32;

/// Identifies one device on the shared bus (its chip-select line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceId(pub u8);

/// Byte-level register access to devices on a shared bus
pub trait RegisterBus {
    /// Read `buf.len()` consecutive registers starting at `address`
    ///
    /// Devices auto-increment the address during a burst, so `buf[0]` holds
    /// `address`, `buf[1]` holds `address + 1`, and so on.
    fn read_register(&mut self, device: DeviceId, address: u8, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write a single register
    fn write_register(&mut self, device: DeviceId, address: u8, value: u8) -> Result<(), BusError>;

    /// Read a burst from a device that returns one pipeline byte before data
    fn read_register_with_dummy(
        &mut self,
        device: DeviceId,
        address: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        let len = buf.len();
        if len >= MAX_BURST_LEN {
            return Err(BusError::BufferTooLong { requested: len + 1, limit: MAX_BURST_LEN });
        }

        let mut burst = [0u8; MAX_BURST_LEN];
        self.read_register(device, address, &mut burst[..=len])?;
        buf.copy_from_slice(&burst[1..=len]);
        Ok(())
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read_register(&mut self, device: DeviceId, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        (**self).read_register(device, address, buf)
    }

    fn write_register(&mut self, device: DeviceId, address: u8, value: u8) -> Result<(), BusError> {
        (**self).write_register(device, address, value)
    }

    fn read_register_with_dummy(
        &mut self,
        device: DeviceId,
        address: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        (**self).read_register_with_dummy(device, address, buf)
    }
}

/// Read `len` bytes into a fresh [`RawSample`]
pub fn read_raw<B: RegisterBus + ?Sized>(
    bus: &mut B,
    device: DeviceId,
    address: u8,
    len: usize,
    dummy: bool,
) -> Result<RawSample, BusError> {
    if len > MAX_BURST_LEN {
        return Err(BusError::BufferTooLong { requested: len, limit: MAX_BURST_LEN });
    }

    let mut buf = [0u8; MAX_BURST_LEN];
    if dummy {
        bus.read_register_with_dummy(device, address, &mut buf[..len])?;
    } else {
        bus.read_register(device, address, &mut buf[..len])?;
    }

    RawSample::from_slice(address, &buf[..len])
}

/// Bounded retry with exponential backoff for identity checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Total identity reads, including the first
    pub attempts: u8,
    /// Delay before the first retry (milliseconds)
    pub initial_backoff_ms: u32,
    /// Multiplier applied to the delay after each retry
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_LIVENESS_ATTEMPTS,
            initial_backoff_ms: DEFAULT_LIVENESS_BACKOFF_MS,
            backoff_factor: DEFAULT_LIVENESS_BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff
    pub fn no_retry() -> Self {
        Self { attempts: 1, initial_backoff_ms: 0, backoff_factor: 1 }
    }
}

/// Description of a device's identity register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// Register holding the fixed id
    pub register: u8,
    /// Value the datasheet guarantees
    pub expected: u8,
    /// Whether reads from this device start with a dummy byte
    pub dummy_byte: bool,
}

/// Read a device's identity register until it matches or the policy gives up
///
/// Bus failures count as failed attempts. When every attempt failed on the
/// bus the last bus error is returned; otherwise a mismatch is reported as
/// [`SensorError::DeviceUnresponsive`].
pub fn check_identity<B, D>(
    bus: &mut B,
    delay: &mut D,
    device: DeviceId,
    identity: Identity,
    policy: RetryPolicy,
) -> SensorResult<()>
where
    B: RegisterBus + ?Sized,
    D: Delay + ?Sized,
{
    let attempts = policy.attempts.max(1);
    let mut backoff_ms = policy.initial_backoff_ms;
    let mut last_error = SensorError::DeviceUnresponsive { expected: identity.expected, found: 0 };

    for attempt in 1..=attempts {
        let mut id = [0u8; 1];
        let read = if identity.dummy_byte {
            bus.read_register_with_dummy(device, identity.register, &mut id)
        } else {
            bus.read_register(device, identity.register, &mut id)
        };

        match read {
            Ok(()) if id[0] == identity.expected => {
                log_debug!("device {:?} identified on attempt {}", device, attempt);
                return Ok(());
            }
            Ok(()) => {
                last_error = SensorError::DeviceUnresponsive {
                    expected: identity.expected,
                    found: id[0],
                };
            }
            Err(err) => last_error = SensorError::Bus(err),
        }

        if attempt < attempts {
            log_warn!(
                "device {:?} identity check failed ({:?}), retrying in {} ms",
                device,
                last_error,
                backoff_ms
            );
            delay.delay_ms(backoff_ms);
            backoff_ms = backoff_ms.saturating_mul(policy.backoff_factor);
        }
    }

    Err(last_error)
}

//! Error Types for Sensor Bring-Up, Conversion and Characterization
//!
//! ## Design Philosophy
//!
//! Errors cross the hardware boundary as plain values, never as panics:
//!
//! 1. **Small Size**: every variant carries a few scalars at most, so errors
//!    can be returned from hot read paths without cost.
//!
//! 2. **No Heap Allocation**: messages are `&'static str`, so the enum works
//!    unchanged on `no_std` targets.
//!
//! 3. **Copy Semantics**: errors are `Copy` and can be stored in status
//!    registers or logged after the fact.
//!
//! ## Error Categories
//!
//! ### Configuration
//! - `Configuration`: an unsupported range, frequency or parameter was
//!   requested. The device keeps its previous configuration.
//! - `NotConfigured`: an axis was read before its first successful
//!   configuration, so no resolution exists yet.
//!
//! ### Device Health
//! - `DeviceUnresponsive`: the identity register did not hold the expected
//!   value after all liveness retries.
//! - `Bus`: the transport reported a timeout or NACK.
//! - `SelfTestFailed`: the self-test displacement was outside the datasheet
//!   window.
//!
//! ### Measurement
//! - `ImplausibleReading`: a compensated value fell outside the device's
//!   operating range.
//! - `InvalidSampleCount`: a noise run was requested with fewer than two
//!   samples.
//!
//! A noise run that hits its timeout is *not* an error: the partial
//! statistic is returned with `NoiseReport::timed_out` set.
//!
//! ```rust
//! use pdc_core::{SensorError, SensorResult};
//!
//! fn handle(result: SensorResult<f32>) {
//!     match result {
//!         Ok(_value) => {}
//!         Err(SensorError::DeviceUnresponsive { .. }) => {
//!             // mark_sensor_offline();
//!         }
//!         Err(SensorError::Configuration { .. }) => {
//!             // keep flying on the previous configuration
//!         }
//!         Err(_) => {}
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Failures reported by the register transport
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The transaction did not complete within the transport's time bound
    #[error("Bus transaction timed out")]
    Timeout,

    /// The device did not acknowledge the transfer
    #[error("Device did not acknowledge address {address:#04x}")]
    Nack {
        /// Register address of the failed transfer
        address: u8,
    },

    /// The requested burst is longer than the transport can handle
    #[error("Burst of {requested} bytes exceeds limit of {limit}")]
    BufferTooLong {
        /// Bytes requested by the caller
        requested: usize,
        /// Largest burst the transport supports
        limit: usize,
    },
}

/// Sensor errors - kept small and `Copy` for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SensorError {
    /// Unsupported configuration value; previous configuration is kept
    #[error("Configuration rejected: {reason}")]
    Configuration {
        /// What was rejected
        reason: &'static str,
    },

    /// Identity register mismatch after all liveness attempts
    #[error("Device unresponsive: expected id {expected:#04x}, found {found:#04x}")]
    DeviceUnresponsive {
        /// Identity value from the datasheet
        expected: u8,
        /// Value actually read on the last attempt
        found: u8,
    },

    /// Transport failure
    #[error("Bus error: {0}")]
    Bus(BusError),

    /// Noise characterization needs at least two samples
    #[error("Invalid sample count {requested}: at least 2 required")]
    InvalidSampleCount {
        /// Sample count that was requested
        requested: usize,
    },

    /// Axis read before the first successful configuration
    #[error("Sensor read before configuration")]
    NotConfigured,

    /// Compensated value outside the device operating range
    #[error("Reading {value} outside plausible range [{min}, {max}]")]
    ImplausibleReading {
        /// The compensated value
        value: f64,
        /// Lower bound of the operating range
        min: f64,
        /// Upper bound of the operating range
        max: f64,
    },

    /// Self-test response outside the datasheet window
    #[error("Self-test failed on {sensor} axis {axis}: delta {delta}")]
    SelfTestFailed {
        /// Which sensor failed ("accelerometer" or "gyroscope")
        sensor: &'static str,
        /// Axis index (0 = X, 1 = Y, 2 = Z)
        axis: u8,
        /// Measured self-test displacement
        delta: f32,
    },
}

impl From<BusError> for SensorError {
    fn from(err: BusError) -> Self {
        SensorError::Bus(err)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BusError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Timeout => defmt::write!(fmt, "Bus timeout"),
            Self::Nack { address } => defmt::write!(fmt, "NACK at {=u8:#x}", address),
            Self::BufferTooLong { requested, limit } => {
                defmt::write!(fmt, "Burst {} > {}", requested, limit)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Configuration { reason } =>
                defmt::write!(fmt, "Configuration: {}", reason),
            Self::DeviceUnresponsive { expected, found } =>
                defmt::write!(fmt, "Unresponsive: want {=u8:#x}, got {=u8:#x}", expected, found),
            Self::Bus(err) =>
                defmt::write!(fmt, "Bus: {}", err),
            Self::InvalidSampleCount { requested } =>
                defmt::write!(fmt, "Need >= 2 samples, got {}", requested),
            Self::NotConfigured =>
                defmt::write!(fmt, "Not configured"),
            Self::ImplausibleReading { value, min, max } =>
                defmt::write!(fmt, "Implausible {} outside [{}, {}]", value, min, max),
            Self::SelfTestFailed { sensor, axis, delta } =>
                defmt::write!(fmt, "Self-test {} axis {} delta {}", sensor, axis, delta),
        }
    }
}

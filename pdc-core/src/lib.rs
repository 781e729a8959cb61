//! Sensor calibration and unit-conversion engine for the PDC flight-data recorder
//!
//! Turns register-level readings from the on-board IMU and barometer into
//! calibrated physical measurements, and characterizes sensor noise while
//! the vehicle waits on the pad.
//!
//! Key constraints:
//! - `no_std` core; `std` only adds logging, serde and a real clock
//! - No heap allocation; register bursts live in fixed-capacity buffers
//! - Single owner per device, enforced with `&mut`
//!
//! ```no_run
//! use pdc_core::{Recorder, RecorderConfig, RegisterBus};
//! use pdc_core::imu::Axis;
//! use pdc_core::time::{MonotonicClock, StdDelay};
//!
//! # fn run(bus: &mut impl RegisterBus) -> pdc_core::SensorResult<()> {
//! let mut recorder = Recorder::new(RecorderConfig::default())?;
//! recorder.bring_up(bus, &mut StdDelay)?;
//!
//! let clock = MonotonicClock::new();
//! let noise = recorder.accel_noise(bus, &clock, &mut StdDelay, Axis::Z, 9.80665)?;
//! let altitude = recorder.baro().read_altitude(bus)?;
//! # let _ = (noise, altitude);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod baro;
pub mod bus;
pub mod codec;
pub mod config;
pub mod constants;
pub mod errors;
pub mod imu;
pub mod noise;
pub mod recorder;
pub mod resolution;
pub mod tables;
pub mod time;

// Public API
pub use baro::{AltitudeModel, Bmp388, CompensationEngine};
pub use bus::{DeviceId, RegisterBus, RetryPolicy};
pub use config::RecorderConfig;
pub use errors::{BusError, SensorError, SensorResult};
pub use imu::{AxisSensor, Lsm6dso32};
pub use noise::{NoiseCharacterizer, NoiseConfig, NoiseReport, PartialRunDivisor, VarianceDivisor};
pub use recorder::Recorder;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

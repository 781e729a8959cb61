//! Constants for the PDC sensor engine
//!
//! Every numeric value used by the conversion code lives here, with its unit
//! in the name and its datasheet source in the docs.
//!
//! ## Organization
//!
//! - **Physics**: gravity, standard atmosphere, barometric formula
//! - **Sensors**: register maps and identity values for the IMU and barometer
//! - **Time**: noise characterization defaults and device settling delays

/// Physical constants used for unit conversion and altitude.
pub mod physics;

/// Register addresses, identity values and command bytes.
pub mod sensors;

/// Sampling intervals, timeouts and settling delays.
pub mod time;

pub use physics::{GRAVITY_MAGNITUDE, SEA_LEVEL_PRESSURE_HPA};

pub use time::{
    DEFAULT_NOISE_INTERVAL_MS, DEFAULT_NOISE_SAMPLES, DEFAULT_NOISE_TIMEOUT_MS,
    DEFAULT_REJECT_THRESHOLD,
};

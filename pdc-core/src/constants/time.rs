//! Time-Related Constants
//!
//! Noise characterization defaults and device settling delays.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

// ===== NOISE CHARACTERIZATION =====

/// Accepted samples per noise run.
pub const DEFAULT_NOISE_SAMPLES: usize = 50;

/// Rate limit between noise samples (milliseconds).
///
/// Gives the sensor time to refresh its output register between reads.
/// This is a minimum spacing, not a timing guarantee.
pub const DEFAULT_NOISE_INTERVAL_MS: u32 = 100;

/// Wall-clock budget for one noise run (milliseconds).
///
/// A sensor that keeps producing rejected samples returns a partial
/// statistic after this long instead of hanging bring-up.
pub const DEFAULT_NOISE_TIMEOUT_MS: u64 = 10 * MS_PER_SECOND;

/// Outlier rejection band around the reference value (physical units).
///
/// 0.3 m/s² is larger than the expected at-rest noise of the accelerometer
/// but rejects the occasional corrupted frame.
pub const DEFAULT_REJECT_THRESHOLD: f32 = 0.3;

// ===== DEVICE SETTLING =====

/// Wait after an IMU reboot before the registers are usable (milliseconds).
pub const IMU_RESET_SETTLE_MS: u32 = 2000;

/// Wait after toggling IMU self-test before reading (milliseconds).
pub const IMU_SELF_TEST_SETTLE_MS: u32 = 500;

/// Wait after each barometer reset step (milliseconds).
pub const BARO_RESET_SETTLE_MS: u32 = 1000;

// ===== LIVENESS RETRIES =====

/// Identity reads before a device is declared unresponsive.
pub const DEFAULT_LIVENESS_ATTEMPTS: u8 = 3;

/// Backoff before the first liveness retry (milliseconds).
pub const DEFAULT_LIVENESS_BACKOFF_MS: u32 = 10;

/// Backoff growth factor between liveness retries.
pub const DEFAULT_LIVENESS_BACKOFF_FACTOR: u32 = 2;

//! Physical Constants for the PDC
//!
//! Fundamental constants used to turn sensor counts into SI units and
//! pressure into altitude.

// ===== GRAVITY =====

/// Standard gravitational acceleration (m/s² per g).
///
/// Used to convert accelerometer readings from g to m/s², and as the
/// expected at-rest reading of a vertical accelerometer axis.
///
/// Source: CGPM 1901, ISO 80000-3
pub const GRAVITY_MAGNITUDE: f32 = 9.80665;

/// Unit factor for angular rate outputs (dps per dps).
///
/// Gyroscope resolution is already expressed in milli-dps per LSB.
pub const ANGULAR_RATE_UNIT_FACTOR: f32 = 1.0;

// ===== ATMOSPHERE =====

/// Standard atmospheric pressure at sea level (hPa).
///
/// Default reference for barometric altitude. Should be replaced by the
/// local QNH or a ground reading before flight.
///
/// Source: International Standard Atmosphere (ISA)
pub const SEA_LEVEL_PRESSURE_HPA: f64 = 1013.25;

/// Pascals per hectopascal.
pub const PA_PER_HPA: f64 = 100.0;

/// Scale height of the simplified barometric formula (m).
///
/// `T₀ / L = 288.15 K / 0.0065 K/m ≈ 44330 m`.
///
/// Source: Bosch BMP180 datasheet, section 3.6
pub const BAROMETRIC_SCALE_M: f64 = 44330.0;

/// Exponent of the simplified barometric formula.
///
/// `R·L / (g·M) ≈ 1 / 5.255`.
///
/// Source: Bosch BMP180 datasheet, section 3.6
pub const BAROMETRIC_EXPONENT: f64 = 0.190295;

// ===== DEVICE OPERATING RANGES =====

/// Lowest pressure the barometer is specified for (Pa).
///
/// Source: Bosch BMP388 datasheet, table 2
pub const BARO_PRESSURE_MIN_PA: f64 = 30_000.0;

/// Highest pressure the barometer is specified for (Pa).
///
/// Source: Bosch BMP388 datasheet, table 2
pub const BARO_PRESSURE_MAX_PA: f64 = 125_000.0;

/// Lowest operating temperature of the barometer (°C).
pub const BARO_TEMPERATURE_MIN_C: f64 = -40.0;

/// Highest operating temperature of the barometer (°C).
pub const BARO_TEMPERATURE_MAX_C: f64 = 85.0;

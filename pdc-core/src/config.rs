//! Recorder configuration
//!
//! One [`RecorderConfig`] carries every tunable of the sensor stack. It is
//! plain data: build it with `Default` and the `with_*` methods (or
//! deserialize it with the `serde` feature), call [`RecorderConfig::validate`]
//! at startup, and hand it to [`Recorder`](crate::recorder::Recorder).
//!
//! ```rust
//! use pdc_core::config::{ImuConfig, RecorderConfig};
//!
//! let config = RecorderConfig::default()
//!     .with_imu(ImuConfig::default().with_accel(104.0, 16));
//! assert!(config.validate().is_ok());
//!
//! let bad = RecorderConfig::default()
//!     .with_imu(ImuConfig::default().with_accel(104.0, 12));
//! assert!(bad.validate().is_err());
//! ```

use crate::baro::AltitudeModel;
use crate::bus::{DeviceId, RetryPolicy};
use crate::constants::physics::SEA_LEVEL_PRESSURE_HPA;
use crate::errors::SensorResult;
use crate::noise::NoiseConfig;
use crate::tables::{ACCEL_RANGE_G, BARO_ODR_HZ, BARO_OSR, GYRO_RANGE_DPS, IMU_ODR_HZ};

/// IMU settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImuConfig {
    /// Chip select of the IMU
    pub device: DeviceId,
    /// Accelerometer output rate (Hz)
    pub accel_odr_hz: f32,
    /// Accelerometer range (±g)
    pub accel_range_g: u16,
    /// Gyroscope output rate (Hz)
    pub gyro_odr_hz: f32,
    /// Gyroscope range (±dps)
    pub gyro_range_dps: u16,
    /// Run the datasheet self-test during bring-up
    pub self_test: bool,
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            device: DeviceId(5),
            accel_odr_hz: 416.0,
            accel_range_g: 32,
            gyro_odr_hz: 416.0,
            gyro_range_dps: 2000,
            self_test: false,
        }
    }
}

impl ImuConfig {
    /// Set the chip select
    pub fn with_device(mut self, device: DeviceId) -> Self {
        self.device = device;
        self
    }

    /// Set accelerometer rate and range
    pub fn with_accel(mut self, odr_hz: f32, range_g: u16) -> Self {
        self.accel_odr_hz = odr_hz;
        self.accel_range_g = range_g;
        self
    }

    /// Set gyroscope rate and range
    pub fn with_gyro(mut self, odr_hz: f32, range_dps: u16) -> Self {
        self.gyro_odr_hz = odr_hz;
        self.gyro_range_dps = range_dps;
        self
    }

    /// Enable or skip the bring-up self-test
    pub fn with_self_test(mut self, enabled: bool) -> Self {
        self.self_test = enabled;
        self
    }

    /// Check every value against the device tables
    pub fn validate(&self) -> SensorResult<()> {
        IMU_ODR_HZ.encode(self.accel_odr_hz)?;
        ACCEL_RANGE_G.encode(self.accel_range_g)?;
        IMU_ODR_HZ.encode(self.gyro_odr_hz)?;
        GYRO_RANGE_DPS.encode(self.gyro_range_dps)?;
        Ok(())
    }
}

/// Barometer settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaroConfig {
    /// Chip select of the barometer
    pub device: DeviceId,
    /// Output rate (Hz)
    pub odr_hz: f32,
    /// Pressure oversampling factor
    pub pressure_oversampling: u8,
    /// Temperature oversampling factor
    pub temperature_oversampling: u8,
    /// Altitude reference (hPa)
    pub sea_level_hpa: f64,
    /// Reject readings outside the device operating range
    pub plausibility_check: bool,
}

impl Default for BaroConfig {
    fn default() -> Self {
        Self {
            device: DeviceId(4),
            odr_hz: 200.0,
            pressure_oversampling: 1,
            temperature_oversampling: 1,
            sea_level_hpa: SEA_LEVEL_PRESSURE_HPA,
            plausibility_check: true,
        }
    }
}

impl BaroConfig {
    /// Set the chip select
    pub fn with_device(mut self, device: DeviceId) -> Self {
        self.device = device;
        self
    }

    /// Set output rate
    pub fn with_odr(mut self, odr_hz: f32) -> Self {
        self.odr_hz = odr_hz;
        self
    }

    /// Set pressure and temperature oversampling
    pub fn with_oversampling(mut self, pressure: u8, temperature: u8) -> Self {
        self.pressure_oversampling = pressure;
        self.temperature_oversampling = temperature;
        self
    }

    /// Set the altitude reference (hPa)
    pub fn with_sea_level(mut self, hpa: f64) -> Self {
        self.sea_level_hpa = hpa;
        self
    }

    /// Enable or disable the operating range check
    pub fn with_plausibility_check(mut self, enabled: bool) -> Self {
        self.plausibility_check = enabled;
        self
    }

    /// Altitude model for the configured reference
    pub fn altitude_model(&self) -> SensorResult<AltitudeModel> {
        AltitudeModel::new(self.sea_level_hpa)
    }

    /// Check every value against the device tables
    pub fn validate(&self) -> SensorResult<()> {
        BARO_ODR_HZ.encode(self.odr_hz)?;
        BARO_OSR.encode(self.pressure_oversampling)?;
        BARO_OSR.encode(self.temperature_oversampling)?;
        self.altitude_model()?;
        Ok(())
    }
}

/// Everything the sensor stack needs at startup
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecorderConfig {
    /// IMU settings
    pub imu: ImuConfig,
    /// Barometer settings
    pub baro: BaroConfig,
    /// Noise characterization parameters
    pub noise: NoiseConfig,
    /// Identity check retries, shared by both devices
    pub liveness: RetryPolicy,
}

impl RecorderConfig {
    /// Replace the IMU section
    pub fn with_imu(mut self, imu: ImuConfig) -> Self {
        self.imu = imu;
        self
    }

    /// Replace the barometer section
    pub fn with_baro(mut self, baro: BaroConfig) -> Self {
        self.baro = baro;
        self
    }

    /// Replace the noise section
    pub fn with_noise(mut self, noise: NoiseConfig) -> Self {
        self.noise = noise;
        self
    }

    /// Replace the liveness retry policy
    pub fn with_liveness(mut self, liveness: RetryPolicy) -> Self {
        self.liveness = liveness;
        self
    }

    /// Validate every section
    pub fn validate(&self) -> SensorResult<()> {
        self.imu.validate()?;
        self.baro.validate()?;
        self.noise.validate()?;
        Ok(())
    }
}

//! Sensor stack bring-up
//!
//! [`Recorder`] owns both devices and runs the startup sequence on the pad:
//!
//! ```text
//! identity → restart → configure → (self-test) → noise characterization
//! ```
//!
//! Each step returns on the first failure, leaving the flight computer to
//! decide whether to retry or fly without the sensor.

use crate::baro::Bmp388;
use crate::bus::RegisterBus;
use crate::config::RecorderConfig;
use crate::errors::SensorResult;
use crate::imu::{Axis, Lsm6dso32};
use crate::noise::{NoiseCharacterizer, NoiseReport};
use crate::time::{Delay, TimeSource};

/// The recorder's IMU and barometer, configured from one [`RecorderConfig`]
#[derive(Debug, Clone)]
pub struct Recorder {
    config: RecorderConfig,
    imu: Lsm6dso32,
    baro: Bmp388,
    characterizer: NoiseCharacterizer,
}

impl Recorder {
    /// Validate `config` and build the (unconfigured) devices
    pub fn new(config: RecorderConfig) -> SensorResult<Self> {
        config.validate()?;

        let imu = Lsm6dso32::new(config.imu.device).with_retry(config.liveness);
        let baro = Bmp388::new(config.baro.device)
            .with_retry(config.liveness)
            .with_plausibility_check(config.baro.plausibility_check)
            .with_altitude_model(config.baro.altitude_model()?);

        Ok(Self {
            config,
            imu,
            baro,
            characterizer: NoiseCharacterizer::new(config.noise),
        })
    }

    /// Configuration the recorder was built from
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// IMU
    pub fn imu(&self) -> &Lsm6dso32 {
        &self.imu
    }

    /// IMU, for reconfiguration
    pub fn imu_mut(&mut self) -> &mut Lsm6dso32 {
        &mut self.imu
    }

    /// Barometer
    pub fn baro(&self) -> &Bmp388 {
        &self.baro
    }

    /// Barometer, for reconfiguration
    pub fn baro_mut(&mut self) -> &mut Bmp388 {
        &mut self.baro
    }

    /// Identify, reset and configure both devices
    pub fn bring_up<B, D>(&mut self, bus: &mut B, delay: &mut D) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
        D: Delay + ?Sized,
    {
        let imu_config = self.config.imu;
        let baro_config = self.config.baro;

        self.imu.check_identity(bus, delay)?;
        self.baro.check_identity(bus, delay)?;

        self.imu.restart(bus, delay)?;
        self.baro.restart(bus, delay)?;

        self.imu
            .accel_mut()
            .configure(bus, imu_config.accel_odr_hz, imu_config.accel_range_g)?;
        self.imu
            .gyro_mut()
            .configure(bus, imu_config.gyro_odr_hz, imu_config.gyro_range_dps)?;
        if imu_config.self_test {
            self.imu.self_test(bus, delay)?;
        }

        self.baro.configure(
            bus,
            baro_config.odr_hz,
            baro_config.pressure_oversampling,
            baro_config.temperature_oversampling,
        )?;

        log_info!("sensor stack up");
        Ok(())
    }

    /// Noise of one accelerometer axis at rest
    ///
    /// `reference` is the expected reading in m/s² (9.80665 on the axis
    /// pointing up, 0 on the others).
    pub fn accel_noise<B, T, D>(
        &self,
        bus: &mut B,
        clock: &T,
        delay: &mut D,
        axis: Axis,
        reference: f32,
    ) -> SensorResult<NoiseReport>
    where
        B: RegisterBus + ?Sized,
        T: TimeSource + ?Sized,
        D: Delay + ?Sized,
    {
        self.imu
            .accel()
            .characterize_noise(bus, axis, &self.characterizer, reference, clock, delay)
    }

    /// Noise of one gyroscope axis at rest (reference 0 dps)
    pub fn gyro_noise<B, T, D>(
        &self,
        bus: &mut B,
        clock: &T,
        delay: &mut D,
        axis: Axis,
    ) -> SensorResult<NoiseReport>
    where
        B: RegisterBus + ?Sized,
        T: TimeSource + ?Sized,
        D: Delay + ?Sized,
    {
        self.imu
            .gyro()
            .characterize_noise(bus, axis, &self.characterizer, 0.0, clock, delay)
    }

    /// Noise of the barometric altitude around `reference_m`
    pub fn altitude_noise<B, T, D>(
        &self,
        bus: &mut B,
        clock: &T,
        delay: &mut D,
        reference_m: f32,
    ) -> SensorResult<NoiseReport>
    where
        B: RegisterBus + ?Sized,
        T: TimeSource + ?Sized,
        D: Delay + ?Sized,
    {
        let baro = &self.baro;
        baro.compensation()?;
        self.characterizer
            .characterize(reference_m, clock, delay, || Ok(baro.read_altitude(bus)? as f32))
    }
}

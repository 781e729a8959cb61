//! LSM6DSO32 inertial measurement unit
//!
//! The chip exposes an accelerometer and a gyroscope behind one chip select.
//! [`Lsm6dso32`] owns both [`AxisSensor`]s and handles the chip-wide
//! operations: identity, reboot and the built-in self-test.

use crate::bus::{check_identity, DeviceId, Identity, RegisterBus, RetryPolicy};
use crate::constants::sensors::{
    IMU_CTRL3_C_REG, IMU_CTRL5_C_REG, IMU_RESET_CMD, IMU_SELF_TEST_ACCEL,
    IMU_SELF_TEST_ACCEL_MAX_G, IMU_SELF_TEST_ACCEL_MIN_G, IMU_SELF_TEST_GYRO,
    IMU_SELF_TEST_GYRO_MAX_DPS, IMU_SELF_TEST_GYRO_MIN_DPS, IMU_WHO_AM_I_REG, IMU_WHO_AM_I_VAL,
};
use crate::constants::time::{IMU_RESET_SETTLE_MS, IMU_SELF_TEST_SETTLE_MS};
use crate::errors::{SensorError, SensorResult};
use crate::time::Delay;

use super::axis::{Accelerometer, AxisKind, AxisSensor, DeviceConfiguration, Gyroscope};

/// Output rate used during self-test (Hz)
const SELF_TEST_ODR_HZ: f32 = 3330.0;
/// Accelerometer range the self-test window is specified at (±g)
const SELF_TEST_ACCEL_RANGE_G: u16 = 4;
/// Gyroscope range the self-test window is specified at (±dps)
const SELF_TEST_GYRO_RANGE_DPS: u16 = 2000;

/// IMU with its accelerometer and gyroscope
#[derive(Debug, Clone)]
pub struct Lsm6dso32 {
    device: DeviceId,
    accel: AxisSensor<Accelerometer>,
    gyro: AxisSensor<Gyroscope>,
    retry: RetryPolicy,
}

impl Lsm6dso32 {
    /// IMU on `device` with the default liveness retry policy
    pub fn new(device: DeviceId) -> Self {
        Self {
            device,
            accel: AxisSensor::new(device),
            gyro: AxisSensor::new(device),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the liveness retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Bus identity of the chip
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Accelerometer
    pub fn accel(&self) -> &AxisSensor<Accelerometer> {
        &self.accel
    }

    /// Accelerometer, for configuration
    pub fn accel_mut(&mut self) -> &mut AxisSensor<Accelerometer> {
        &mut self.accel
    }

    /// Gyroscope
    pub fn gyro(&self) -> &AxisSensor<Gyroscope> {
        &self.gyro
    }

    /// Gyroscope, for configuration
    pub fn gyro_mut(&mut self) -> &mut AxisSensor<Gyroscope> {
        &mut self.gyro
    }

    /// Confirm WHO_AM_I reads 0x6C, retrying per the policy
    pub fn check_identity<B, D>(&self, bus: &mut B, delay: &mut D) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
        D: Delay + ?Sized,
    {
        let identity = Identity {
            register: IMU_WHO_AM_I_REG,
            expected: IMU_WHO_AM_I_VAL,
            dummy_byte: false,
        };
        check_identity(bus, delay, self.device, identity, self.retry)
    }

    /// Boolean form of [`check_identity`](Self::check_identity)
    pub fn is_alive<B, D>(&self, bus: &mut B, delay: &mut D) -> bool
    where
        B: RegisterBus + ?Sized,
        D: Delay + ?Sized,
    {
        self.check_identity(bus, delay).is_ok()
    }

    /// Reboot memory contents and reset all registers
    ///
    /// Both sensors are unconfigured afterwards.
    pub fn restart<B, D>(&mut self, bus: &mut B, delay: &mut D) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
        D: Delay + ?Sized,
    {
        bus.write_register(self.device, IMU_CTRL3_C_REG, IMU_RESET_CMD)?;
        self.accel.mark_unconfigured();
        self.gyro.mark_unconfigured();
        delay.delay_ms(IMU_RESET_SETTLE_MS);
        log_info!("IMU {:?} restarted", self.device);
        Ok(())
    }

    /// Run the datasheet self-test on both sensors
    ///
    /// Each sensor is read with the internal actuator off and on; the
    /// per-axis change must fall inside the datasheet window (0.05 to 1.7 g,
    /// 150 to 700 dps). The configuration in effect before the test is
    /// written back afterwards, pass or fail.
    pub fn self_test<B, D>(&mut self, bus: &mut B, delay: &mut D) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
        D: Delay + ?Sized,
    {
        let accel_before = self.accel.configuration().copied();
        let gyro_before = self.gyro.configuration().copied();

        let outcome = self.run_self_test(bus, delay);

        // The actuator must not stay on, whatever happened above.
        let cleared = bus.write_register(self.device, IMU_CTRL5_C_REG, 0);
        let restored = self.restore(bus, accel_before, gyro_before);

        outcome?;
        cleared?;
        restored?;
        log_info!("IMU {:?} self-test passed", self.device);
        Ok(())
    }

    fn run_self_test<B, D>(&mut self, bus: &mut B, delay: &mut D) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
        D: Delay + ?Sized,
    {
        self.accel.configure(bus, SELF_TEST_ODR_HZ, SELF_TEST_ACCEL_RANGE_G)?;
        self.gyro.configure(bus, SELF_TEST_ODR_HZ, SELF_TEST_GYRO_RANGE_DPS)?;

        let accel_delta = self.actuated_delta(bus, delay, &self.accel, IMU_SELF_TEST_ACCEL)?;
        check_window::<Accelerometer>(accel_delta, IMU_SELF_TEST_ACCEL_MIN_G, IMU_SELF_TEST_ACCEL_MAX_G)?;

        let gyro_delta = self.actuated_delta(bus, delay, &self.gyro, IMU_SELF_TEST_GYRO)?;
        check_window::<Gyroscope>(gyro_delta, IMU_SELF_TEST_GYRO_MIN_DPS, IMU_SELF_TEST_GYRO_MAX_DPS)
    }

    /// Per-axis output change when `enable` is written to CTRL5_C
    fn actuated_delta<B, D, K>(
        &self,
        bus: &mut B,
        delay: &mut D,
        sensor: &AxisSensor<K>,
        enable: u8,
    ) -> SensorResult<[f32; 3]>
    where
        B: RegisterBus + ?Sized,
        D: Delay + ?Sized,
        K: AxisKind,
    {
        let off = sensor.read_all_native(bus)?;

        bus.write_register(self.device, IMU_CTRL5_C_REG, enable)?;
        delay.delay_ms(IMU_SELF_TEST_SETTLE_MS);
        let on = sensor.read_all_native(bus);

        bus.write_register(self.device, IMU_CTRL5_C_REG, 0)?;
        delay.delay_ms(IMU_SELF_TEST_SETTLE_MS);

        let on = on?;
        Ok([on[0] - off[0], on[1] - off[1], on[2] - off[2]])
    }

    fn restore<B>(
        &mut self,
        bus: &mut B,
        accel: Option<DeviceConfiguration>,
        gyro: Option<DeviceConfiguration>,
    ) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
    {
        if let Some(config) = accel {
            self.accel.restore(bus, config)?;
        }
        if let Some(config) = gyro {
            self.gyro.restore(bus, config)?;
        }
        Ok(())
    }
}

/// Every axis must move by a magnitude inside `[min, max]`
fn check_window<K: AxisKind>(delta: [f32; 3], min: f32, max: f32) -> SensorResult<()> {
    for (axis, &change) in delta.iter().enumerate() {
        let magnitude = libm::fabsf(change);
        if !(min..=max).contains(&magnitude) {
            log_warn!("{} self-test axis {} moved {} (window {}..{})", K::NAME, axis, change, min, max);
            return Err(SensorError::SelfTestFailed {
                sensor: K::NAME,
                axis: axis as u8,
                delta: change,
            });
        }
    }
    Ok(())
}

//! Three-axis inertial sensor
//!
//! The accelerometer and gyroscope inside the IMU differ only in where their
//! registers sit, which ranges they support and what unit they report. One
//! generic [`AxisSensor`] covers both, parameterized by an [`AxisKind`].
//!
//! ## Configuration lifecycle
//!
//! ```text
//! Unconfigured ──configure(ok)──▶ Configured(range, odr, resolution)
//!       ▲                               │
//!       └──── reset ─────    configure(err) leaves it untouched
//! ```
//!
//! Both bit codes are looked up before anything is written, and the stored
//! configuration (including the resolution) changes only after the register
//! write succeeds.

use core::marker::PhantomData;

use crate::bus::{read_raw, DeviceId, RegisterBus};
use crate::codec::CodeTable;
use crate::constants::physics::{ANGULAR_RATE_UNIT_FACTOR, GRAVITY_MAGNITUDE};
use crate::constants::sensors::{
    IMU_CTRL1_XL_REG, IMU_CTRL2_G_REG, IMU_OUTX_L_A_REG, IMU_OUTX_L_G_REG,
};
use crate::errors::{SensorError, SensorResult};
use crate::noise::{NoiseCharacterizer, NoiseReport};
use crate::resolution::Resolution;
use crate::tables::{ACCEL_RANGE_G, GYRO_RANGE_DPS, IMU_ODR_HZ};
use crate::time::{Delay, TimeSource};

/// Register layout and tables of one kind of axis sensor
pub trait AxisKind {
    /// Human-readable name for logs
    const NAME: &'static str;
    /// Control register holding ODR and range
    const CTRL_REG: u8;
    /// Low byte of the X-axis output; Y and Z follow at +2 and +4
    const DATA_REG: u8;
    /// Supported measurement ranges
    const RANGES: CodeTable<u16>;
    /// Factor from the native unit to the reported unit
    const UNIT_FACTOR: f32;
}

/// Accelerometer: ±g ranges, reports m/s²
#[derive(Debug, Clone, Copy)]
pub struct Accelerometer;

impl AxisKind for Accelerometer {
    const NAME: &'static str = "accelerometer";
    const CTRL_REG: u8 = IMU_CTRL1_XL_REG;
    const DATA_REG: u8 = IMU_OUTX_L_A_REG;
    const RANGES: CodeTable<u16> = ACCEL_RANGE_G;
    const UNIT_FACTOR: f32 = GRAVITY_MAGNITUDE;
}

/// Gyroscope: ±dps ranges, reports dps
#[derive(Debug, Clone, Copy)]
pub struct Gyroscope;

impl AxisKind for Gyroscope {
    const NAME: &'static str = "gyroscope";
    const CTRL_REG: u8 = IMU_CTRL2_G_REG;
    const DATA_REG: u8 = IMU_OUTX_L_G_REG;
    const RANGES: CodeTable<u16> = GYRO_RANGE_DPS;
    const UNIT_FACTOR: f32 = ANGULAR_RATE_UNIT_FACTOR;
}

/// One of the three sensing axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// All axes in register order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Byte offset of the axis from the X low byte
    pub fn register_offset(self) -> u8 {
        match self {
            Axis::X => 0,
            Axis::Y => 2,
            Axis::Z => 4,
        }
    }

    /// Index into `[x, y, z]` arrays
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Last configuration successfully written to a sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceConfiguration {
    /// Output data rate (Hz)
    pub output_frequency_hz: f32,
    /// ODR bit code as written
    pub output_frequency_code: u8,
    /// Measurement range (±g or ±dps)
    pub measurement_range: u16,
    /// Range bit code as written
    pub measurement_range_code: u8,
    /// Scale matching `measurement_range`
    pub resolution: Resolution,
}

/// Generic three-axis sensor behind a shared IMU chip select
#[derive(Debug, Clone)]
pub struct AxisSensor<K: AxisKind> {
    device: DeviceId,
    configuration: Option<DeviceConfiguration>,
    _kind: PhantomData<K>,
}

impl<K: AxisKind> AxisSensor<K> {
    /// Unconfigured sensor on `device`
    pub fn new(device: DeviceId) -> Self {
        Self { device, configuration: None, _kind: PhantomData }
    }

    /// Bus identity of the sensor
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Current configuration, `None` until the first successful configure
    pub fn configuration(&self) -> Option<&DeviceConfiguration> {
        self.configuration.as_ref()
    }

    /// Resolution of the current configuration
    pub fn resolution(&self) -> SensorResult<Resolution> {
        self.configuration
            .map(|config| config.resolution)
            .ok_or(SensorError::NotConfigured)
    }

    /// Encode and write output rate and range
    ///
    /// On any failure, lookup or bus, the previous configuration stays in
    /// effect.
    pub fn configure<B>(&mut self, bus: &mut B, frequency_hz: f32, range: u16) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
    {
        let range_code = K::RANGES.encode(range).map_err(|err| {
            log_warn!("{}: rejected range {}", K::NAME, range);
            err
        })?;
        let frequency_code = IMU_ODR_HZ.encode(frequency_hz).map_err(|err| {
            log_warn!("{}: rejected output rate {} Hz", K::NAME, frequency_hz);
            err
        })?;

        let value = (frequency_code << 4) | (range_code << 1);
        bus.write_register(self.device, K::CTRL_REG, value)?;

        self.configuration = Some(DeviceConfiguration {
            output_frequency_hz: frequency_hz,
            output_frequency_code: frequency_code,
            measurement_range: range,
            measurement_range_code: range_code,
            resolution: Resolution::for_range(range, K::UNIT_FACTOR),
        });
        log_debug!(
            "{}: configured ±{} at {} Hz (ctrl {:#04x})",
            K::NAME,
            range,
            frequency_hz,
            value
        );
        Ok(())
    }

    /// Re-apply a configuration captured earlier
    pub fn restore<B>(&mut self, bus: &mut B, configuration: DeviceConfiguration) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
    {
        self.configure(bus, configuration.output_frequency_hz, configuration.measurement_range)
    }

    /// Forget the configuration after the device itself was reset
    pub(crate) fn mark_unconfigured(&mut self) {
        self.configuration = None;
    }

    /// Raw signed count of one axis
    pub fn read_raw<B>(&self, bus: &mut B, axis: Axis) -> SensorResult<i16>
    where
        B: RegisterBus + ?Sized,
    {
        let mut bytes = [0u8; 2];
        bus.read_register(self.device, K::DATA_REG + axis.register_offset(), &mut bytes)?;
        Ok(i16::from_le_bytes(bytes))
    }

    /// One axis in physical units (m/s² or dps)
    pub fn read_axis<B>(&self, bus: &mut B, axis: Axis) -> SensorResult<f32>
    where
        B: RegisterBus + ?Sized,
    {
        let resolution = self.resolution()?;
        Ok(resolution.to_physical(self.read_raw(bus, axis)?))
    }

    /// One axis in the native unit (g or dps)
    pub fn read_axis_native<B>(&self, bus: &mut B, axis: Axis) -> SensorResult<f32>
    where
        B: RegisterBus + ?Sized,
    {
        let resolution = self.resolution()?;
        Ok(resolution.to_native(self.read_raw(bus, axis)?))
    }

    /// X axis in physical units
    pub fn read_x<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> SensorResult<f32> {
        self.read_axis(bus, Axis::X)
    }

    /// Y axis in physical units
    pub fn read_y<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> SensorResult<f32> {
        self.read_axis(bus, Axis::Y)
    }

    /// Z axis in physical units
    pub fn read_z<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> SensorResult<f32> {
        self.read_axis(bus, Axis::Z)
    }

    /// All three axes from a single six-byte burst, in physical units
    pub fn read_all<B>(&self, bus: &mut B) -> SensorResult<[f32; 3]>
    where
        B: RegisterBus + ?Sized,
    {
        let resolution = self.resolution()?;
        Ok(self.read_counts(bus)?.map(|raw| resolution.to_physical(raw)))
    }

    /// All three axes from a single burst, in the native unit
    pub fn read_all_native<B>(&self, bus: &mut B) -> SensorResult<[f32; 3]>
    where
        B: RegisterBus + ?Sized,
    {
        let resolution = self.resolution()?;
        Ok(self.read_counts(bus)?.map(|raw| resolution.to_native(raw)))
    }

    fn read_counts<B>(&self, bus: &mut B) -> SensorResult<[i16; 3]>
    where
        B: RegisterBus + ?Sized,
    {
        let sample = read_raw(bus, self.device, K::DATA_REG, 6, false)?;

        let mut counts = [0i16; 3];
        for axis in Axis::ALL {
            let raw = sample
                .field(usize::from(axis.register_offset()), 2, true)
                .ok_or(SensorError::Configuration { reason: "short axis burst" })?;
            counts[axis.index()] = raw as i16;
        }
        Ok(counts)
    }

    /// Measure the at-rest noise of one axis
    ///
    /// `reference` is the value the axis should read while still, in
    /// physical units (9.80665 for a vertical accelerometer axis, 0 for a
    /// gyroscope axis).
    pub fn characterize_noise<B, T, D>(
        &self,
        bus: &mut B,
        axis: Axis,
        characterizer: &NoiseCharacterizer,
        reference: f32,
        clock: &T,
        delay: &mut D,
    ) -> SensorResult<NoiseReport>
    where
        B: RegisterBus + ?Sized,
        T: TimeSource + ?Sized,
        D: Delay + ?Sized,
    {
        self.resolution()?;
        characterizer.characterize(reference, clock, delay, || self.read_axis(bus, axis))
    }
}

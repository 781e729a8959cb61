//! BMP388 barometric pressure sensor
//!
//! Every read from this device clocks out one dummy byte first, so all
//! reads go through [`RegisterBus::read_register_with_dummy`].
//!
//! Configuration writes the output data rate and oversampling registers and
//! then loads the factory calibration; readings are refused until that has
//! succeeded once.

use crate::bus::{check_identity, read_raw, DeviceId, Identity, RegisterBus, RetryPolicy};
use crate::constants::sensors::{
    BARO_CHIP_ID_REG, BARO_CHIP_ID_VAL, BARO_CMD_REG, BARO_DATA_BURST_LEN, BARO_ODR_REG,
    BARO_OSR_REG, BARO_PRESSURE_DATA_REG, BARO_PWR_CTRL_REG, BARO_PWR_NORMAL_MODE,
    BARO_SOFT_RESET_CMD, BARO_TEMPERATURE_DATA_REG,
};
use crate::constants::time::BARO_RESET_SETTLE_MS;
use crate::errors::{SensorError, SensorResult};
use crate::tables::{BARO_ODR_HZ, BARO_OSR};
use crate::time::Delay;

use super::altitude::AltitudeModel;
use super::calibration::{CalibrationParameterSet, CompensationEngine};

/// Settings last written to the barometer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaroConfiguration {
    /// Output data rate (Hz)
    pub output_frequency_hz: f32,
    /// Pressure oversampling factor
    pub pressure_oversampling: u8,
    /// Temperature oversampling factor
    pub temperature_oversampling: u8,
}

/// Raw 24-bit counts from one conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawConversion {
    /// Uncompensated pressure
    pub pressure: u32,
    /// Uncompensated temperature
    pub temperature: u32,
}

/// One compensated conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaroMeasurement {
    /// Temperature (°C)
    pub temperature_c: f64,
    /// Pressure (Pa)
    pub pressure_pa: f64,
    /// Altitude above the model's reference (m)
    pub altitude_m: f64,
}

/// Barometer wrapper
#[derive(Debug, Clone)]
pub struct Bmp388 {
    device: DeviceId,
    retry: RetryPolicy,
    plausibility: bool,
    altitude: AltitudeModel,
    configuration: Option<BaroConfiguration>,
    calibration: Option<CalibrationParameterSet>,
    engine: Option<CompensationEngine>,
}

impl Bmp388 {
    /// Unconfigured barometer on `device`
    pub fn new(device: DeviceId) -> Self {
        Self {
            device,
            retry: RetryPolicy::default(),
            plausibility: false,
            altitude: AltitudeModel::default(),
            configuration: None,
            calibration: None,
            engine: None,
        }
    }

    /// Replace the liveness retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Reject compensated readings outside the operating range
    pub fn with_plausibility_check(mut self, enabled: bool) -> Self {
        self.plausibility = enabled;
        self.engine = self.engine.map(|engine| engine.with_plausibility_check(enabled));
        self
    }

    /// Use `altitude` for pressure-to-altitude conversion
    pub fn with_altitude_model(mut self, altitude: AltitudeModel) -> Self {
        self.altitude = altitude;
        self
    }

    /// Bus identity of the chip
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Settings in effect, `None` until the first successful configure
    pub fn configuration(&self) -> Option<&BaroConfiguration> {
        self.configuration.as_ref()
    }

    /// Calibration coefficients, once loaded
    pub fn calibration(&self) -> Option<&CalibrationParameterSet> {
        self.calibration.as_ref()
    }

    /// Compensation engine built from the device's calibration
    pub fn compensation(&self) -> SensorResult<&CompensationEngine> {
        self.engine.as_ref().ok_or(SensorError::NotConfigured)
    }

    /// Current altitude reference
    pub fn altitude_model(&self) -> &AltitudeModel {
        &self.altitude
    }

    /// Confirm CHIP_ID reads 0x50, retrying per the policy
    pub fn check_identity<B, D>(&self, bus: &mut B, delay: &mut D) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
        D: Delay + ?Sized,
    {
        let identity = Identity {
            register: BARO_CHIP_ID_REG,
            expected: BARO_CHIP_ID_VAL,
            dummy_byte: true,
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

    /// Soft reset, then enable both sensors in normal mode
    ///
    /// The device forgets its ODR and OSR settings, so the wrapper is
    /// unconfigured afterwards.
    pub fn restart<B, D>(&mut self, bus: &mut B, delay: &mut D) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
        D: Delay + ?Sized,
    {
        bus.write_register(self.device, BARO_CMD_REG, BARO_SOFT_RESET_CMD)?;
        self.configuration = None;
        self.calibration = None;
        self.engine = None;
        delay.delay_ms(BARO_RESET_SETTLE_MS);

        bus.write_register(self.device, BARO_PWR_CTRL_REG, BARO_PWR_NORMAL_MODE)?;
        delay.delay_ms(BARO_RESET_SETTLE_MS);
        log_info!("barometer {:?} restarted", self.device);
        Ok(())
    }

    /// Write output rate and oversampling, then load the calibration
    ///
    /// All three values are validated before anything is written. If a bus
    /// transaction fails part-way the chip may already hold some of the new
    /// settings, so the wrapper drops to unconfigured and readings return
    /// [`SensorError::NotConfigured`] until `configure` succeeds.
    pub fn configure<B>(
        &mut self,
        bus: &mut B,
        frequency_hz: f32,
        pressure_oversampling: u8,
        temperature_oversampling: u8,
    ) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
    {
        let odr = BARO_ODR_HZ.encode(frequency_hz)?;
        let pressure_osr = BARO_OSR.encode(pressure_oversampling)?;
        let temperature_osr = BARO_OSR.encode(temperature_oversampling)?;

        if let Err(err) = self.apply(bus, odr, (temperature_osr << 3) | pressure_osr) {
            log_warn!("barometer {:?} configuration interrupted: {:?}", self.device, err);
            self.configuration = None;
            self.calibration = None;
            self.engine = None;
            return Err(err);
        }

        self.configuration = Some(BaroConfiguration {
            output_frequency_hz: frequency_hz,
            pressure_oversampling,
            temperature_oversampling,
        });
        log_debug!(
            "barometer configured: {} Hz, osr p×{} t×{}",
            frequency_hz,
            pressure_oversampling,
            temperature_oversampling
        );
        Ok(())
    }

    fn apply<B>(&mut self, bus: &mut B, odr: u8, osr: u8) -> SensorResult<()>
    where
        B: RegisterBus + ?Sized,
    {
        bus.write_register(self.device, BARO_ODR_REG, odr)?;
        bus.write_register(self.device, BARO_OSR_REG, osr)?;
        self.load_calibration(bus)?;
        Ok(())
    }

    /// Read the factory calibration in one NVM burst
    pub fn load_calibration<B>(&mut self, bus: &mut B) -> SensorResult<CalibrationParameterSet>
    where
        B: RegisterBus + ?Sized,
    {
        let params = CalibrationParameterSet::read_burst(bus, self.device)?;
        self.engine = Some(CompensationEngine::new(&params).with_plausibility_check(self.plausibility));
        self.calibration = Some(params);
        Ok(params)
    }

    /// Raw pressure and temperature from a single six-byte burst
    pub fn read_raw<B>(&self, bus: &mut B) -> SensorResult<RawConversion>
    where
        B: RegisterBus + ?Sized,
    {
        let sample = read_raw(bus, self.device, BARO_PRESSURE_DATA_REG, BARO_DATA_BURST_LEN, true)?;
        let short = SensorError::Configuration { reason: "short barometer burst" };
        let pressure = sample.field(0, 3, false).ok_or(short)?;
        let temperature = sample.field(3, 3, false).ok_or(short)?;
        Ok(RawConversion { pressure: pressure as u32, temperature: temperature as u32 })
    }

    /// Raw 24-bit temperature count alone
    pub fn read_raw_temperature<B>(&self, bus: &mut B) -> SensorResult<u32>
    where
        B: RegisterBus + ?Sized,
    {
        read_u24(bus, self.device, BARO_TEMPERATURE_DATA_REG)
    }

    /// Raw 24-bit pressure count alone
    pub fn read_raw_pressure<B>(&self, bus: &mut B) -> SensorResult<u32>
    where
        B: RegisterBus + ?Sized,
    {
        read_u24(bus, self.device, BARO_PRESSURE_DATA_REG)
    }

    /// Compensated temperature (°C)
    pub fn read_temperature<B>(&self, bus: &mut B) -> SensorResult<f64>
    where
        B: RegisterBus + ?Sized,
    {
        let engine = self.compensation()?;
        engine.compensate_temperature(self.read_raw_temperature(bus)?)
    }

    /// Compensated pressure (Pa)
    pub fn read_pressure<B>(&self, bus: &mut B) -> SensorResult<f64>
    where
        B: RegisterBus + ?Sized,
    {
        Ok(self.read_measurement(bus)?.pressure_pa)
    }

    /// Altitude above the reference (m)
    pub fn read_altitude<B>(&self, bus: &mut B) -> SensorResult<f64>
    where
        B: RegisterBus + ?Sized,
    {
        Ok(self.read_measurement(bus)?.altitude_m)
    }

    /// Temperature, pressure and altitude from one conversion
    pub fn read_measurement<B>(&self, bus: &mut B) -> SensorResult<BaroMeasurement>
    where
        B: RegisterBus + ?Sized,
    {
        let engine = self.compensation()?;
        let raw = self.read_raw(bus)?;

        let temperature_c = engine.compensate_temperature(raw.temperature)?;
        let pressure_pa = engine.compensate_pressure(raw.pressure, temperature_c)?;
        Ok(BaroMeasurement {
            temperature_c,
            pressure_pa,
            altitude_m: self.altitude.altitude(pressure_pa),
        })
    }

    /// Re-reference altitude to the current pressure
    ///
    /// Returns the ground pressure used (Pa).
    pub fn zero_altitude<B>(&mut self, bus: &mut B) -> SensorResult<f64>
    where
        B: RegisterBus + ?Sized,
    {
        let ground = self.read_pressure(bus)?;
        self.altitude = AltitudeModel::with_ground_reference(ground)?;
        log_info!("altitude referenced to {} Pa", ground);
        Ok(ground)
    }
}

fn read_u24<B>(bus: &mut B, device: DeviceId, address: u8) -> SensorResult<u32>
where
    B: RegisterBus + ?Sized,
{
    let sample = read_raw(bus, device, address, 3, true)?;
    Ok(sample.decode(false) as u32)
}

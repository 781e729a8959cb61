//! Factory Calibration and Compensation
//!
//! Each barometer is trimmed at the factory; fourteen coefficients in its
//! non-volatile memory turn raw 24-bit ADC counts into °C and Pa.
//!
//! ## Coefficient conversion
//!
//! ```text
//! coefficient = (raw - offset) / 2^exponent
//! ```
//!
//! `raw` is the little-endian NVM value, signed or unsigned per descriptor.
//! `offset` is 2^14 for P1 and P2 and zero elsewhere. Negative exponents
//! scale up.
//!
//! ## Compensation
//!
//! ```text
//! d1    = U_t - T1
//! compT = d1·T2 + d1²·T3
//!
//! A     = P5 + P6·compT + P7·compT² + P8·compT³
//! B     = U_p · (P1 + P2·compT + P3·compT² + P4·compT³)
//! C     = U_p²·(P9 + P10·compT) + U_p³·P11
//! compP = A + B + C
//! ```
//!
//! All arithmetic is `f64`; the polynomial terms span more than 60 binary
//! orders of magnitude.

use crate::bus::{DeviceId, RegisterBus};
use crate::codec::decode_raw;
use crate::constants::physics::{
    BARO_PRESSURE_MAX_PA, BARO_PRESSURE_MIN_PA, BARO_TEMPERATURE_MAX_C, BARO_TEMPERATURE_MIN_C,
};
use crate::constants::sensors::{BARO_NVM_LEN, BARO_NVM_START_REG};
use crate::errors::{SensorError, SensorResult};

/// Where one calibration coefficient lives and how to scale it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationDescriptor {
    /// Datasheet name (T1..T3, P1..P11)
    pub name: &'static str,
    /// NVM register of the least significant byte
    pub address: u8,
    /// Width in bytes (1 or 2)
    pub byte_width: u8,
    /// Two's complement when true
    pub signed: bool,
    /// Power of two the raw value is divided by
    pub exponent: i32,
    /// Subtracted from the raw value before scaling
    pub offset: i64,
}

impl CalibrationDescriptor {
    const fn new(name: &'static str, address: u8, byte_width: u8, signed: bool, exponent: i32) -> Self {
        Self { name, address, byte_width, signed, exponent, offset: 0 }
    }

    const fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Scale a decoded NVM value into its floating point coefficient
    pub fn scale(&self, raw: i64) -> f64 {
        libm::ldexp((raw - self.offset) as f64, -self.exponent)
    }

    /// Decode this coefficient from its little-endian bytes
    pub fn decode(&self, bytes: &[u8]) -> f64 {
        self.scale(decode_raw(bytes, self.signed, u32::from(self.byte_width) * 8))
    }
}

/// Number of calibration coefficients
pub const CALIBRATION_PARAMS: usize = 14;

/// NVM layout, in register order
pub const CALIBRATION_TABLE: [CalibrationDescriptor; CALIBRATION_PARAMS] = [
    CalibrationDescriptor::new("T1", 0x31, 2, false, -8),
    CalibrationDescriptor::new("T2", 0x33, 2, false, 30),
    CalibrationDescriptor::new("T3", 0x35, 1, true, 48),
    CalibrationDescriptor::new("P1", 0x36, 2, true, 20).with_offset(1 << 14),
    CalibrationDescriptor::new("P2", 0x38, 2, true, 29).with_offset(1 << 14),
    CalibrationDescriptor::new("P3", 0x3A, 1, true, 32),
    CalibrationDescriptor::new("P4", 0x3B, 1, true, 37),
    CalibrationDescriptor::new("P5", 0x3C, 2, false, -3),
    CalibrationDescriptor::new("P6", 0x3E, 2, false, 6),
    CalibrationDescriptor::new("P7", 0x40, 1, true, 8),
    CalibrationDescriptor::new("P8", 0x41, 1, true, 15),
    CalibrationDescriptor::new("P9", 0x42, 2, true, 48),
    CalibrationDescriptor::new("P10", 0x44, 1, true, 48),
    CalibrationDescriptor::new("P11", 0x45, 1, true, 65),
];

/// The fourteen scaled coefficients, in [`CALIBRATION_TABLE`] order
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationParameterSet {
    coefficients: [f64; CALIBRATION_PARAMS],
}

impl CalibrationParameterSet {
    /// Decode a full NVM burst starting at register 0x31
    pub fn from_nvm(nvm: &[u8; BARO_NVM_LEN]) -> Self {
        let mut coefficients = [0.0; CALIBRATION_PARAMS];
        for (coefficient, descriptor) in coefficients.iter_mut().zip(CALIBRATION_TABLE.iter()) {
            let start = usize::from(descriptor.address - BARO_NVM_START_REG);
            let end = start + usize::from(descriptor.byte_width);
            *coefficient = descriptor.decode(&nvm[start..end]);
        }
        Self { coefficients }
    }

    /// Read every coefficient with its own register access
    pub fn read_each<B>(bus: &mut B, device: DeviceId) -> SensorResult<Self>
    where
        B: RegisterBus + ?Sized,
    {
        let mut coefficients = [0.0; CALIBRATION_PARAMS];
        for (coefficient, descriptor) in coefficients.iter_mut().zip(CALIBRATION_TABLE.iter()) {
            let mut raw = [0u8; 2];
            let bytes = &mut raw[..usize::from(descriptor.byte_width)];
            bus.read_register_with_dummy(device, descriptor.address, bytes)?;
            *coefficient = descriptor.decode(bytes);
        }
        Ok(Self { coefficients })
    }

    /// Read the whole NVM block in one burst
    pub fn read_burst<B>(bus: &mut B, device: DeviceId) -> SensorResult<Self>
    where
        B: RegisterBus + ?Sized,
    {
        let mut nvm = [0u8; BARO_NVM_LEN];
        bus.read_register_with_dummy(device, BARO_NVM_START_REG, &mut nvm)?;
        Ok(Self::from_nvm(&nvm))
    }

    /// Coefficient by datasheet name
    pub fn get(&self, name: &str) -> Option<f64> {
        CALIBRATION_TABLE
            .iter()
            .position(|descriptor| descriptor.name == name)
            .map(|index| self.coefficients[index])
    }

    /// All coefficients in table order
    pub fn coefficients(&self) -> &[f64; CALIBRATION_PARAMS] {
        &self.coefficients
    }
}

/// Applies the compensation polynomials for one calibrated device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensationEngine {
    t: [f64; 3],
    p: [f64; 11],
    plausibility: bool,
}

impl CompensationEngine {
    /// Engine for a loaded parameter set, without range checks
    pub fn new(params: &CalibrationParameterSet) -> Self {
        let c = params.coefficients();
        Self {
            t: [c[0], c[1], c[2]],
            p: [c[3], c[4], c[5], c[6], c[7], c[8], c[9], c[10], c[11], c[12], c[13]],
            plausibility: false,
        }
    }

    /// Reject results outside the device's operating range
    pub fn with_plausibility_check(mut self, enabled: bool) -> Self {
        self.plausibility = enabled;
        self
    }

    /// Compensated temperature (°C) from a raw 24-bit count
    pub fn compensate_temperature(&self, uncompensated: u32) -> SensorResult<f64> {
        let [t1, t2, t3] = self.t;
        let d1 = f64::from(uncompensated) - t1;
        let temperature = d1 * t2 + d1 * d1 * t3;

        if self.plausibility {
            check_range(temperature, BARO_TEMPERATURE_MIN_C, BARO_TEMPERATURE_MAX_C)?;
        }
        Ok(temperature)
    }

    /// Compensated pressure (Pa) from a raw 24-bit count and `compensate_temperature`'s output
    pub fn compensate_pressure(&self, uncompensated: u32, temperature: f64) -> SensorResult<f64> {
        let [p1, p2, p3, p4, p5, p6, p7, p8, p9, p10, p11] = self.p;
        let t = temperature;
        let t2 = t * t;
        let t3 = t2 * t;
        let up = f64::from(uncompensated);
        let up2 = up * up;

        let a = p5 + p6 * t + p7 * t2 + p8 * t3;
        let b = up * (p1 + p2 * t + p3 * t2 + p4 * t3);
        let c = up2 * (p9 + p10 * t) + up2 * up * p11;
        let pressure = a + b + c;

        if self.plausibility {
            check_range(pressure, BARO_PRESSURE_MIN_PA, BARO_PRESSURE_MAX_PA)?;
        }
        Ok(pressure)
    }
}

fn check_range(value: f64, min: f64, max: f64) -> SensorResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        log_warn!("implausible reading {} outside [{}, {}]", value, min, max);
        Err(SensorError::ImplausibleReading { value, min, max })
    }
}

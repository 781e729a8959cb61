//! Barometric altitude
//!
//! ```text
//! altitude = 44330 × (1 - (p_hPa / reference_hPa)^0.190295)
//! ```
//!
//! The reference defaults to standard sea-level pressure. Re-referencing to
//! a ground reading taken on the pad makes altitude read relative to the
//! launch site.

use crate::constants::physics::{
    BAROMETRIC_EXPONENT, BAROMETRIC_SCALE_M, PA_PER_HPA, SEA_LEVEL_PRESSURE_HPA,
};
use crate::errors::{SensorError, SensorResult};

/// Pressure-to-altitude conversion for one reference pressure
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AltitudeModel {
    reference_hpa: f64,
}

impl Default for AltitudeModel {
    fn default() -> Self {
        Self { reference_hpa: SEA_LEVEL_PRESSURE_HPA }
    }
}

impl AltitudeModel {
    /// Model referenced to `reference_hpa`
    pub fn new(reference_hpa: f64) -> SensorResult<Self> {
        if !reference_hpa.is_finite() || reference_hpa <= 0.0 {
            return Err(SensorError::Configuration {
                reason: "reference pressure must be positive and finite",
            });
        }
        Ok(Self { reference_hpa })
    }

    /// Model that reads zero at `ground_pressure_pa`
    pub fn with_ground_reference(ground_pressure_pa: f64) -> SensorResult<Self> {
        Self::new(ground_pressure_pa / PA_PER_HPA)
    }

    /// Reference pressure (hPa)
    pub fn reference_hpa(&self) -> f64 {
        self.reference_hpa
    }

    /// Altitude (m) above the reference for a compensated pressure (Pa)
    ///
    /// Negative pressure has no real altitude and yields NaN, and zero gives
    /// the formula's 44 330 m ceiling. The compensation plausibility check
    /// stops such readings before they get here.
    pub fn altitude(&self, pressure_pa: f64) -> f64 {
        let ratio = (pressure_pa / PA_PER_HPA) / self.reference_hpa;
        BAROMETRIC_SCALE_M * (1.0 - libm::pow(ratio, BAROMETRIC_EXPONENT))
    }
}

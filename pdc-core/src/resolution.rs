//! Per-LSB resolution of 16-bit inertial outputs
//!
//! A signed 16-bit output spans the full configured range in both
//! directions, so one count is worth
//!
//! ```text
//! resolution = (range × 2 × 1000) / 65536      milli-units per LSB
//! physical   = (raw / 1000) × resolution × unit_factor
//! ```
//!
//! With `unit_factor` = 9.80665 for accelerometers (g → m/s²) and 1 for
//! gyroscopes (dps).

/// Number of distinct codes of a 16-bit output
const OUTPUT_CODES: f32 = 65536.0;

/// Resolution of a 16-bit output configured for `range` (milli-units per LSB)
pub fn resolution_for_range(range: u16) -> f32 {
    (f32::from(range) * 2.0 * 1000.0) / OUTPUT_CODES
}

/// Scale from raw counts to physical units for one configured range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    milli_units_per_lsb: f32,
    unit_factor: f32,
}

impl Resolution {
    /// Resolution for `range`, converting into physical units with `unit_factor`
    pub fn for_range(range: u16, unit_factor: f32) -> Self {
        Self {
            milli_units_per_lsb: resolution_for_range(range),
            unit_factor,
        }
    }

    /// Milli-units (mg, mdps) per least-significant bit
    pub fn milli_units_per_lsb(&self) -> f32 {
        self.milli_units_per_lsb
    }

    /// Factor applied after scaling (m/s² per g, or 1)
    pub fn unit_factor(&self) -> f32 {
        self.unit_factor
    }

    /// Convert a raw signed count into physical units
    pub fn to_physical(&self, raw: i16) -> f32 {
        (f32::from(raw) / 1000.0) * self.milli_units_per_lsb * self.unit_factor
    }

    /// Convert a raw count into the sensor's native unit (g or dps)
    pub fn to_native(&self, raw: i16) -> f32 {
        (f32::from(raw) / 1000.0) * self.milli_units_per_lsb
    }
}

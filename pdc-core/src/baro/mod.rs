//! Barometric altimeter
//!
//! - [`calibration`]: NVM coefficient table and compensation polynomials
//! - [`altitude`]: pressure to altitude
//! - [`device`]: the BMP388 wrapper tying both to the bus

pub mod altitude;
pub mod calibration;
pub mod device;

pub use altitude::AltitudeModel;
pub use calibration::{
    CalibrationDescriptor, CalibrationParameterSet, CompensationEngine, CALIBRATION_TABLE,
};
pub use device::{BaroConfiguration, BaroMeasurement, Bmp388, RawConversion};

//! Inertial measurement unit
//!
//! - [`axis`]: generic three-axis sensor shared by accelerometer and gyroscope
//! - [`device`]: the LSM6DSO32 chip owning both sensors

pub mod axis;
pub mod device;

pub use axis::{Accelerometer, Axis, AxisKind, AxisSensor, DeviceConfiguration, Gyroscope};
pub use device::Lsm6dso32;
